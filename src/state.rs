use crate::config::ScanConfig;
use crate::features::card::{CatimaBarcode, ParseResult, ParseResultType};
use crate::features::events::{ConsumerId, ScanEvent};
use crate::features::import::ImportSource;
use crate::features::observable::SubscriptionId;
use crate::features::view_model::ScanViewModel;
use crate::i18n::tr;
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishStatus {
    Ok,
    Canceled,
}

/// Card data handed back to the caller when the screen finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishPayload {
    pub card_id: String,
    pub barcode_type: Option<CatimaBarcode>,
    pub parse_type: ParseResultType,
    pub add_group: Option<String>,
}

/// Something the host has to do on its side: camera calls, activity launches, toasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum HostEffect {
    CaptureResume,
    CapturePause,
    CaptureDestroy,
    ScannerResume,
    ScannerPause,
    TorchOn,
    TorchOff,
    InvalidateMenu,
    CameraErrorChanged {
        visible: bool,
        clickable: bool,
        message: Option<String>,
    },
    Finish {
        status: FinishStatus,
        result: Option<FinishPayload>,
    },
    RequestStoragePermission {
        request_code: i32,
    },
    LaunchBarcodeSelector {
        card_id: Option<String>,
    },
    LaunchPicker {
        source: ImportSource,
        mime_type: String,
        chooser_title: String,
        failure_message: String,
    },
    OpenAppSettings,
    Toast {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    OtherOptions,
    /// `edited` turns on the blank-input error once the user has typed or submitted.
    ManualEntry { input: String, edited: bool },
    ManualAddWarning,
    Disambiguator { candidates: Vec<ParseResult> },
}

/// Everything one scan screen needs between commands.
pub struct ScanSession {
    pub vm: ScanViewModel,
    pub config: ScanConfig,
    pub dialog: Option<Dialog>,
    pub compact_error: bool,
    /// Set once a camera decode went through; the preview decodes a single code.
    pub decoded: bool,
    observers: Vec<SubscriptionId>,
    consumer: Option<ConsumerId>,
    effects_tx: Sender<HostEffect>,
    effects_rx: Receiver<HostEffect>,
}

impl ScanSession {
    pub fn new(config: ScanConfig) -> Self {
        let (effects_tx, effects_rx) = mpsc::channel();
        Self {
            vm: ScanViewModel::new(),
            config,
            dialog: None,
            compact_error: false,
            decoded: false,
            observers: Vec::new(),
            consumer: None,
            effects_tx,
            effects_rx,
        }
    }

    pub fn is_started(&self) -> bool {
        self.consumer.is_some()
    }

    /// Subscribes the host-facing observers and attaches the event consumer.
    pub fn start(&mut self) {
        if self.is_started() {
            return;
        }

        let tx = self.effects_tx.clone();
        let scanner = self.vm.observe_scanner_active(move |active| {
            let effect = if *active {
                HostEffect::ScannerResume
            } else {
                HostEffect::ScannerPause
            };
            let _ = tx.send(effect);
        });

        let tx = self.effects_tx.clone();
        let torch = self.vm.observe_torch(move |on| {
            let effect = if *on { HostEffect::TorchOn } else { HostEffect::TorchOff };
            let _ = tx.send(effect);
            let _ = tx.send(HostEffect::InvalidateMenu);
        });

        let tx = self.effects_tx.clone();
        let error = self.vm.observe_camera_error(move |error| {
            let effect = match error {
                None => HostEffect::CameraErrorChanged {
                    visible: false,
                    clickable: false,
                    message: None,
                },
                Some(e) if e.is_permission_error => HostEffect::CameraErrorChanged {
                    visible: true,
                    clickable: true,
                    message: Some(tr("camera.no_permission")),
                },
                Some(e) => HostEffect::CameraErrorChanged {
                    visible: true,
                    clickable: false,
                    message: e.message.clone(),
                },
            };
            let _ = tx.send(effect);
        });

        self.observers = vec![scanner, torch, error];
        self.consumer = Some(self.vm.attach_events());
        log::debug!("scan session started");
    }

    pub fn stop(&mut self) {
        for id in self.observers.drain(..) {
            self.vm.unobserve(id);
        }
        if let Some(id) = self.consumer.take() {
            self.vm.detach_events(id);
        }
        log::debug!(
            "scan session stopped with {} pending events",
            self.vm.pending_events()
        );
    }

    pub fn emit(&self, effect: HostEffect) {
        let _ = self.effects_tx.send(effect);
    }

    /// Collects observer effects, then turns pending one-shot events into effects.
    pub fn take_effects(&mut self) -> Vec<HostEffect> {
        let events = match self.consumer {
            Some(id) => self.vm.drain_events(id),
            None => Vec::new(),
        };
        for event in events {
            self.apply_event(event);
        }
        self.effects_rx.try_iter().collect()
    }

    fn apply_event(&mut self, event: ScanEvent) {
        match event {
            ScanEvent::FinishWithResult(result) => {
                self.dialog = None;
                self.decoded = true;
                self.emit(HostEffect::Finish {
                    status: FinishStatus::Ok,
                    result: Some(FinishPayload {
                        card_id: result.card.card_id,
                        barcode_type: result.card.barcode_type,
                        parse_type: result.kind,
                        add_group: self.vm.add_group.clone(),
                    }),
                });
            }
            ScanEvent::RequestPermission(request_code) => {
                self.emit(HostEffect::RequestStoragePermission { request_code });
            }
            ScanEvent::LaunchManualAdd => {
                self.dialog = Some(Dialog::ManualAddWarning);
            }
            ScanEvent::LaunchImagePicker => self.emit_picker(ImportSource::Image),
            ScanEvent::LaunchPdfPicker => self.emit_picker(ImportSource::Pdf),
            ScanEvent::LaunchPkpassPicker => self.emit_picker(ImportSource::Pkpass),
        }
    }

    fn emit_picker(&self, source: ImportSource) {
        self.emit(HostEffect::LaunchPicker {
            source,
            mime_type: source.mime_type().to_string(),
            chooser_title: tr(source.chooser_title_key()),
            failure_message: tr(source.launch_failure_key()),
        });
    }
}

pub struct AppState {
    pub session: Option<ScanSession>,
    pub locale: String,
    pub last_error: Option<String>,
}

impl AppState {
    // const so it can be used in static initialization
    pub const fn new() -> Self {
        Self {
            session: None,
            locale: String::new(),
            last_error: None,
        }
    }

    pub fn reset_runtime(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
        self.session = None;
        self.last_error = None;
    }
}
