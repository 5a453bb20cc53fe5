//! Scan screen state holder.
//!
//! Holds the transient screen state as observables and turns user intent
//! into either a state change or a queued [`ScanEvent`]. It knows nothing
//! about views and never fails: every input is accepted as is.
use crate::config::{EXTRA_ADD_GROUP, EXTRA_CARD_ID, SAVED_SCANNER_ACTIVE_KEY};
use crate::features::card::{CatimaBarcode, ParseResult};
use crate::features::events::{ConsumerId, EventQueue, ScanEvent};
use crate::features::import::ImportSource;
use crate::features::observable::{Observable, SubscriptionId};
use crate::features::AddOption;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraError {
    pub message: Option<String>,
    pub is_permission_error: bool,
}

/// Optional values the screen was launched with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchExtras {
    pub card_id: Option<String>,
    pub add_group: Option<String>,
}

impl LaunchExtras {
    pub fn from_bundle(bundle: &Map<String, Value>) -> Self {
        let string = |key: &str| bundle.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            card_id: string(EXTRA_CARD_ID),
            add_group: string(EXTRA_ADD_GROUP),
        }
    }
}

#[derive(Debug)]
pub struct ScanViewModel {
    pub card_id: Option<String>,
    pub add_group: Option<String>,
    torch_on: Observable<bool>,
    scanner_active: Observable<bool>,
    camera_error: Observable<Option<CameraError>>,
    events: EventQueue<ScanEvent>,
}

impl ScanViewModel {
    pub const fn new() -> Self {
        Self {
            card_id: None,
            add_group: None,
            torch_on: Observable::new(false),
            scanner_active: Observable::new(true),
            camera_error: Observable::new(None),
            events: EventQueue::new(),
        }
    }

    pub fn process_intent(&mut self, extras: Option<&LaunchExtras>) {
        if let Some(extras) = extras {
            self.card_id = extras.card_id.clone();
            self.add_group = extras.add_group.clone();
        }
    }

    pub fn save_instance_state(&self, out: &mut Map<String, Value>) {
        out.insert(
            SAVED_SCANNER_ACTIVE_KEY.into(),
            Value::Bool(*self.scanner_active.get()),
        );
    }

    pub fn restore_instance_state(&mut self, saved: Option<&Map<String, Value>>) {
        let active = saved
            .and_then(|m| m.get(SAVED_SCANNER_ACTIVE_KEY))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        self.scanner_active.set(active);
    }

    pub fn scanner_active(&self) -> bool {
        *self.scanner_active.get()
    }

    pub fn torch_on(&self) -> bool {
        *self.torch_on.get()
    }

    pub fn camera_error(&self) -> Option<&CameraError> {
        self.camera_error.get().as_ref()
    }

    pub fn toggle_torch(&mut self) {
        self.torch_on.update(|on| !on);
    }

    pub fn set_scanner_active(&mut self, active: bool) {
        self.scanner_active.set(active);
    }

    pub fn on_barcode_result(&mut self, text: impl Into<String>, format: CatimaBarcode) {
        self.on_parse_result_chosen(ParseResult::barcode_only(text, Some(format)));
    }

    pub fn on_add_option_selected(&mut self, option: AddOption) {
        let event = match option {
            AddOption::ManualAdd => ScanEvent::LaunchManualAdd,
            AddOption::FromImage => ScanEvent::RequestPermission(ImportSource::Image.permission_code()),
            AddOption::FromPdf => ScanEvent::RequestPermission(ImportSource::Pdf.permission_code()),
            AddOption::FromPkpass => {
                ScanEvent::RequestPermission(ImportSource::Pkpass.permission_code())
            }
        };
        self.events.emit(event);
    }

    /// The only way the screen produces its final result.
    pub fn on_parse_result_chosen(&mut self, result: ParseResult) {
        self.events.emit(ScanEvent::FinishWithResult(result));
    }

    /// Storage permission answer for one of the import sources.
    pub fn on_storage_permission_result(&mut self, source: ImportSource, granted: bool) {
        if granted {
            self.events.emit(source.picker_event());
        } else {
            self.scanner_active.set(true);
        }
    }

    pub fn on_capture_manager_error(&mut self, message: impl Into<String>) {
        self.camera_error.set(Some(CameraError {
            message: Some(message.into()),
            is_permission_error: false,
        }));
    }

    pub fn on_camera_permission_missing(&mut self) {
        self.camera_error.set(Some(CameraError {
            message: None,
            is_permission_error: true,
        }));
    }

    pub fn on_camera_permission_granted(&mut self) {
        self.camera_error.set(None);
    }

    pub fn observe_scanner_active<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&bool) + Send + 'static,
    {
        self.scanner_active.subscribe(callback)
    }

    pub fn observe_torch<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&bool) + Send + 'static,
    {
        self.torch_on.subscribe(callback)
    }

    pub fn observe_camera_error<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Option<CameraError>) + Send + 'static,
    {
        self.camera_error.subscribe(callback)
    }

    /// Drops a subscription made through any of the `observe_*` methods.
    pub fn unobserve(&mut self, id: SubscriptionId) {
        let _ = self.scanner_active.unsubscribe(id)
            || self.torch_on.unsubscribe(id)
            || self.camera_error.unsubscribe(id);
    }

    pub fn attach_events(&mut self) -> ConsumerId {
        self.events.attach()
    }

    pub fn detach_events(&mut self, id: ConsumerId) {
        self.events.detach(id);
    }

    pub fn drain_events(&mut self, id: ConsumerId) -> Vec<ScanEvent> {
        self.events.drain(id)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl Default for ScanViewModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn drain_all(vm: &mut ScanViewModel) -> Vec<ScanEvent> {
        let id = vm.attach_events();
        let events = vm.drain_events(id);
        vm.detach_events(id);
        events
    }

    #[test]
    fn defaults_match_a_fresh_screen() {
        let vm = ScanViewModel::new();
        assert!(vm.scanner_active());
        assert!(!vm.torch_on());
        assert!(vm.camera_error().is_none());
        assert_eq!(vm.pending_events(), 0);
    }

    #[test]
    fn each_add_option_queues_exactly_one_event_without_touching_state() {
        let expected = [
            (1, ScanEvent::LaunchManualAdd),
            (2, ScanEvent::RequestPermission(100)),
            (3, ScanEvent::RequestPermission(101)),
            (4, ScanEvent::RequestPermission(102)),
        ];
        for (index, event) in expected {
            let mut vm = ScanViewModel::new();
            vm.set_scanner_active(false);
            let option = AddOption::from_index(index).expect("valid option index");
            vm.on_add_option_selected(option);
            assert_eq!(drain_all(&mut vm), vec![event]);
            assert!(!vm.scanner_active());
            assert!(!vm.torch_on());
            assert!(vm.camera_error().is_none());
        }
    }

    #[test]
    fn out_of_range_option_indices_are_unrepresentable() {
        for index in [0, 5, 255] {
            assert!(AddOption::from_index(index).is_none());
        }
    }

    #[test]
    fn torch_toggles_back_after_two_calls() {
        let mut vm = ScanViewModel::new();
        vm.toggle_torch();
        assert!(vm.torch_on());
        vm.toggle_torch();
        assert!(!vm.torch_on());
    }

    #[test]
    fn scanner_flag_survives_save_and_restore() {
        let mut vm = ScanViewModel::new();
        vm.set_scanner_active(false);
        vm.toggle_torch();
        let mut bundle = Map::new();
        vm.save_instance_state(&mut bundle);
        assert_eq!(bundle.get("scannerActive"), Some(&Value::Bool(false)));

        let mut recreated = ScanViewModel::new();
        recreated.restore_instance_state(Some(&bundle));
        assert!(!recreated.scanner_active());
        assert!(!recreated.torch_on());
    }

    #[test]
    fn restore_without_saved_flag_defaults_to_active() {
        let mut vm = ScanViewModel::new();
        vm.set_scanner_active(false);
        vm.restore_instance_state(None);
        assert!(vm.scanner_active());

        vm.set_scanner_active(false);
        vm.restore_instance_state(Some(&Map::new()));
        assert!(vm.scanner_active());
    }

    #[test]
    fn capture_error_is_cleared_by_permission_grant() {
        let mut vm = ScanViewModel::new();
        vm.on_capture_manager_error("X");
        assert_eq!(
            vm.camera_error(),
            Some(&CameraError {
                message: Some("X".into()),
                is_permission_error: false
            })
        );
        vm.on_camera_permission_granted();
        assert!(vm.camera_error().is_none());

        vm.on_camera_permission_missing();
        assert_eq!(
            vm.camera_error(),
            Some(&CameraError {
                message: None,
                is_permission_error: true
            })
        );
        vm.on_camera_permission_granted();
        assert!(vm.camera_error().is_none());
    }

    #[test]
    fn camera_error_leaves_scanner_flag_alone() {
        let mut vm = ScanViewModel::new();
        vm.on_capture_manager_error("no camera");
        assert!(vm.scanner_active());
    }

    #[test]
    fn barcode_result_finishes_with_matching_card() {
        let mut vm = ScanViewModel::new();
        vm.on_barcode_result("ABC123", CatimaBarcode::EAN_13);
        let events = drain_all(&mut vm);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ScanEvent::FinishWithResult(result) => {
                assert_eq!(result.card.card_id, "ABC123");
                assert_eq!(result.card.barcode_type, Some(CatimaBarcode::EAN_13));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn empty_barcode_text_is_passed_through() {
        let mut vm = ScanViewModel::new();
        vm.on_barcode_result("", CatimaBarcode::QR_CODE);
        assert!(matches!(
            drain_all(&mut vm).as_slice(),
            [ScanEvent::FinishWithResult(r)] if r.card.card_id.is_empty()
        ));
    }

    #[test]
    fn events_queued_while_detached_arrive_in_order() {
        let mut vm = ScanViewModel::new();
        vm.on_add_option_selected(AddOption::FromPdf);
        vm.on_add_option_selected(AddOption::ManualAdd);
        assert_eq!(
            drain_all(&mut vm),
            vec![ScanEvent::RequestPermission(101), ScanEvent::LaunchManualAdd]
        );
        assert!(drain_all(&mut vm).is_empty());
    }

    #[test]
    fn storage_permission_grant_launches_picker_and_denial_resumes() {
        let mut vm = ScanViewModel::new();
        vm.set_scanner_active(false);
        vm.on_storage_permission_result(ImportSource::Pkpass, true);
        assert_eq!(drain_all(&mut vm), vec![ScanEvent::LaunchPkpassPicker]);
        assert!(!vm.scanner_active());

        vm.on_storage_permission_result(ImportSource::Image, false);
        assert!(drain_all(&mut vm).is_empty());
        assert!(vm.scanner_active());
    }

    #[test]
    fn process_intent_reads_optional_extras() {
        let mut vm = ScanViewModel::new();
        vm.process_intent(None);
        assert!(vm.card_id.is_none());

        let bundle: Map<String, Value> =
            serde_json::from_str(r#"{"cardId": "9876", "addGroup": "Groceries", "other": 1}"#)
                .unwrap();
        vm.process_intent(Some(&LaunchExtras::from_bundle(&bundle)));
        assert_eq!(vm.card_id.as_deref(), Some("9876"));
        assert_eq!(vm.add_group.as_deref(), Some("Groceries"));
    }

    #[test]
    fn observers_see_current_value_then_changes() {
        let mut vm = ScanViewModel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = vm.observe_scanner_active(move |active| sink.lock().unwrap().push(*active));
        vm.set_scanner_active(false);
        vm.set_scanner_active(false);
        vm.unobserve(id);
        vm.set_scanner_active(true);
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }
}
