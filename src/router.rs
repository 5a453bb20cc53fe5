use crate::config::{ScanConfig, CAMERA_PERMISSION_REQUEST_CODE};
use crate::features::card::{CatimaBarcode, ParseResult};
use crate::features::decoder::{decode_frame, LumaFrame};
use crate::features::import::{collect_import_results, ImportCandidate, ImportSource};
use crate::features::scan_screen::{render_scan_screen, CARD_ID_BINDING};
use crate::features::view_model::LaunchExtras;
use crate::features::ChooserChoice;
use crate::i18n::{tr, update_locale};
use crate::logging;
use crate::state::{AppState, Dialog, FinishStatus, HostEffect, ScanSession};
use jni::objects::{JByteArray, JClass, JString};
use jni::sys::{jint, jstring};
use jni::JNIEnv;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    os::unix::io::{FromRawFd, RawFd},
    ptr,
    sync::{Mutex, MutexGuard},
};

static STATE: Mutex<AppState> = Mutex::new(AppState::new());

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Command {
    action: String,
    extras: Option<Map<String, Value>>,
    saved_state: Option<Map<String, Value>>,
    config: Option<ScanConfig>,
    locale: Option<String>,
    has_camera: Option<bool>,
    camera_permission_granted: Option<bool>,
    screen_height_px: Option<f64>,
    density: Option<f64>,
    finishing: Option<bool>,
    index: Option<usize>,
    text: Option<String>,
    format: Option<String>,
    error: Option<String>,
    request_code: Option<i32>,
    granted: Option<bool>,
    source: Option<String>,
    canceled: Option<bool>,
    fd: Option<i32>,
    path: Option<String>,
    candidates: Option<Vec<ImportCandidate>>,
    bindings: Option<HashMap<String, String>>,
}

#[derive(Debug)]
enum Action {
    Reset,
    Create {
        extras: Option<Map<String, Value>>,
        saved_state: Option<Map<String, Value>>,
        config: Option<ScanConfig>,
        locale: Option<String>,
    },
    Start,
    Stop,
    Resume {
        has_camera: bool,
        permission_granted: bool,
        screen_height_px: Option<f64>,
        density: Option<f64>,
    },
    Pause,
    SaveState,
    Destroy {
        finishing: bool,
    },
    ToggleTorch,
    NavigateUp,
    OtherOptions,
    OtherOptionSelected {
        index: usize,
    },
    DialogCancel,
    ManualEntryChanged {
        input: String,
    },
    ManualEntrySubmit {
        input: Option<String>,
    },
    ManualAddContinue,
    BarcodeDecoded {
        text: String,
        format: String,
    },
    CaptureError {
        message: String,
    },
    PermissionResult {
        request_code: i32,
        granted: bool,
    },
    PickerLaunchFailed {
        source: ImportSource,
    },
    /// `source: None` is a result from the barcode selector after a manual add.
    ImportResult {
        source: Option<ImportSource>,
        canceled: bool,
        fd: Option<i32>,
        path: Option<String>,
        candidates: Vec<ImportCandidate>,
    },
    DisambiguatorChoose {
        index: usize,
    },
    DisambiguatorDismiss,
    OpenPermissionSettings,
}

struct FdHandle(Option<i32>);

impl FdHandle {
    fn new(fd: Option<i32>) -> Self {
        Self(fd)
    }

    fn take(&mut self) -> Option<i32> {
        self.0.take()
    }
}

impl Drop for FdHandle {
    fn drop(&mut self) {
        if let Some(fd) = self.0.take() {
            unsafe { File::from_raw_fd(fd as RawFd) };
        }
    }
}

fn parse_source(name: Option<&str>) -> Result<ImportSource, String> {
    let name = name.ok_or_else(|| "missing_source".to_string())?;
    ImportSource::parse(name).ok_or_else(|| format!("unknown_source:{name}"))
}

fn parse_action(command: Command) -> Result<Action, String> {
    let Command {
        action,
        extras,
        saved_state,
        config,
        locale,
        has_camera,
        camera_permission_granted,
        screen_height_px,
        density,
        finishing,
        index,
        text,
        format,
        error,
        request_code,
        granted,
        source,
        canceled,
        fd,
        path,
        candidates,
        bindings,
    } = command;
    let binding = |key: &str| bindings.as_ref().and_then(|b| b.get(key).cloned());

    match action.as_str() {
        "reset" => Ok(Action::Reset),
        "create" => Ok(Action::Create {
            extras,
            saved_state,
            config,
            locale,
        }),
        "start" => Ok(Action::Start),
        "stop" => Ok(Action::Stop),
        "resume" => Ok(Action::Resume {
            has_camera: has_camera.unwrap_or(true),
            permission_granted: camera_permission_granted.unwrap_or(false),
            screen_height_px,
            density,
        }),
        "pause" => Ok(Action::Pause),
        "save_state" => Ok(Action::SaveState),
        "destroy" => Ok(Action::Destroy {
            finishing: finishing.unwrap_or(false),
        }),
        "toggle_torch" => Ok(Action::ToggleTorch),
        "navigate_up" => Ok(Action::NavigateUp),
        "other_options" => Ok(Action::OtherOptions),
        "other_option_selected" => Ok(Action::OtherOptionSelected {
            index: index.ok_or_else(|| "missing_index".to_string())?,
        }),
        "dialog_cancel" => Ok(Action::DialogCancel),
        "manual_entry_changed" => Ok(Action::ManualEntryChanged {
            input: binding(CARD_ID_BINDING).or(text).unwrap_or_default(),
        }),
        "manual_entry_submit" => Ok(Action::ManualEntrySubmit {
            input: binding(CARD_ID_BINDING).or(text),
        }),
        "manual_add_continue" => Ok(Action::ManualAddContinue),
        "barcode_decoded" => Ok(Action::BarcodeDecoded {
            text: text.ok_or_else(|| "missing_text".to_string())?,
            format: format.ok_or_else(|| "missing_format".to_string())?,
        }),
        "capture_error" => Ok(Action::CaptureError {
            message: error.unwrap_or_default(),
        }),
        "permission_result" => Ok(Action::PermissionResult {
            request_code: request_code.ok_or_else(|| "missing_request_code".to_string())?,
            granted: granted.unwrap_or(false),
        }),
        "picker_launch_failed" => Ok(Action::PickerLaunchFailed {
            source: parse_source(source.as_deref())?,
        }),
        "import_result" => Ok(Action::ImportResult {
            source: match source.as_deref() {
                None | Some("barcode_selector") => None,
                other => Some(parse_source(other)?),
            },
            canceled: canceled.unwrap_or(false),
            fd,
            path,
            candidates: candidates.unwrap_or_default(),
        }),
        "disambiguator_choose" => Ok(Action::DisambiguatorChoose {
            index: index.ok_or_else(|| "missing_index".to_string())?,
        }),
        "disambiguator_dismiss" => Ok(Action::DisambiguatorDismiss),
        "open_permission_settings" => Ok(Action::OpenPermissionSettings),
        other => Err(format!("unknown_action:{other}")),
    }
}

#[no_mangle]
pub extern "system" fn Java_protect_card_1locker_ScanBridge_dispatch(
    mut env: JNIEnv,
    _class: JClass,
    input: JString,
) -> jstring {
    let response = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let input_str: String = env
            .get_string(&input)
            .map(|s| s.into())
            .unwrap_or_else(|_| "{}".to_string());

        let command: Command = serde_json::from_str(&input_str)
            .map_err(|e| format!("invalid_json:{e}"))?;

        handle_command(command)
    }));

    let json_value = match response {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => error_ui(&err),
        Err(_) => error_ui("panic"),
    };

    let output_string = json_value.to_string();
    match env.new_string(output_string) {
        Ok(java_str) => java_str.into_raw(),
        Err(_) => {
            let fallback = error_ui("jni_new_string_failed").to_string();
            env.new_string(fallback)
                .map(|s| s.into_raw())
                .unwrap_or(ptr::null_mut())
        }
    }
}

/// Feeds one preview frame to the decoder. Returns a screen response when the
/// frame produced a result, null otherwise.
#[no_mangle]
pub extern "system" fn Java_protect_card_1locker_ScanBridge_processCameraFrame(
    env: JNIEnv,
    _class: JClass,
    luma_array: JByteArray,
    width: jint,
    height: jint,
    row_stride: jint,
    rotation_deg: jint,
) -> jstring {
    let response = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let luma_data = env
            .convert_byte_array(&luma_array)
            .map_err(|e| format!("jni_luma_array_err:{e}"))?;
        let frame = LumaFrame {
            data: &luma_data,
            width: u32::try_from(width).map_err(|_| format!("invalid_width:{width}"))?,
            height: u32::try_from(height).map_err(|_| format!("invalid_height:{height}"))?,
            row_stride: u32::try_from(row_stride)
                .map_err(|_| format!("invalid_row_stride:{row_stride}"))?,
            rotation_deg: u16::try_from(rotation_deg)
                .map_err(|_| format!("invalid_rotation:{rotation_deg}"))?,
        };

        match handle_camera_frame(&frame)? {
            Some(value) => env
                .new_string(value.to_string())
                .map(|s| s.into_raw())
                .map_err(|e| format!("jni_new_string_err:{e}")),
            None => Ok(ptr::null_mut()),
        }
    }));

    match response {
        Ok(Ok(res)) => res,
        Ok(Err(err)) => {
            log::warn!("camera frame rejected: {err}");
            ptr::null_mut()
        }
        Err(_) => ptr::null_mut(),
    }
}

fn lock_state() -> (MutexGuard<'static, AppState>, bool) {
    match STATE.lock() {
        Ok(guard) => (guard, false),
        Err(poisoned) => (poisoned.into_inner(), true),
    }
}

/// Decodes outside the state lock so dispatch stays responsive while rxing works.
fn handle_camera_frame(frame: &LumaFrame<'_>) -> Result<Option<Value>, String> {
    let (state, _) = lock_state();
    let config = match state.session.as_ref() {
        Some(session) if wants_frames(session) => session.config.clone(),
        _ => return Ok(None),
    };
    drop(state);

    let decoded = match decode_frame(frame, &config) {
        Ok(Some(decoded)) => decoded,
        Ok(None) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    let (mut state, _) = lock_state();
    let Some(session) = state.session.as_mut() else {
        return Ok(None);
    };
    // Another frame or a dialog may have won the race while the lock was released.
    if !wants_frames(session) {
        return Ok(None);
    }
    log::info!("camera decoded {} barcode", decoded.format.name());
    session.decoded = true;
    session.vm.on_barcode_result(decoded.text, decoded.format);
    Ok(Some(respond(&mut state)))
}

fn wants_frames(session: &ScanSession) -> bool {
    session.vm.scanner_active() && !session.decoded
}

fn handle_command(command: Command) -> Result<Value, String> {
    let (mut state, lock_poisoned) = lock_state();

    let action = match parse_action(command) {
        Ok(action) => action,
        Err(err) => {
            log::warn!("rejected command: {err}");
            if state.session.is_none() {
                return Err(err);
            }
            state.last_error = Some(err);
            return Ok(respond(&mut state));
        }
    };
    log::debug!("dispatch {action:?}");

    if lock_poisoned && state.last_error.is_none() {
        state.last_error = Some("state_poisoned".into());
    }

    match action {
        Action::Reset => {
            state.reset_runtime();
            Ok(json!({ "type": "Reset" }))
        }
        Action::Create {
            extras,
            saved_state,
            config,
            locale,
        } => {
            logging::init();
            if let Some(locale) = locale.as_deref() {
                update_locale(&mut state, locale);
                log::debug!("locale set to {}", state.locale);
            }
            let session = state.session.get_or_insert_with(|| {
                log::info!("creating scan session");
                ScanSession::new(config.clone().unwrap_or_default())
            });
            if let Some(config) = config {
                session.config = config;
            }
            let extras = extras.as_ref().map(LaunchExtras::from_bundle);
            session.vm.process_intent(extras.as_ref());
            if saved_state.is_some() {
                session.vm.restore_instance_state(saved_state.as_ref());
            }
            session.dialog = None;
            Ok(respond(&mut state))
        }
        Action::SaveState => {
            let session = state
                .session
                .as_ref()
                .ok_or_else(|| "no_active_session".to_string())?;
            let mut saved = Map::new();
            session.vm.save_instance_state(&mut saved);
            Ok(json!({ "type": "SavedState", "state": saved }))
        }
        Action::Destroy { finishing } => {
            let mut session = state
                .session
                .take()
                .ok_or_else(|| "no_active_session".to_string())?;
            session.emit(HostEffect::CaptureDestroy);
            let effects = session.take_effects();
            if finishing {
                session.stop();
                log::info!("scan session finished");
            } else {
                state.session = Some(session);
            }
            Ok(json!({ "type": "Screen", "ui": Value::Null, "effects": effects }))
        }
        action => {
            let session = state
                .session
                .as_mut()
                .ok_or_else(|| "no_active_session".to_string())?;
            if let Err(err) = apply_session_action(session, action) {
                log::warn!("action failed: {err}");
                state.last_error = Some(err);
            }
            Ok(respond(&mut state))
        }
    }
}

fn apply_session_action(session: &mut ScanSession, action: Action) -> Result<(), String> {
    match action {
        Action::Start => session.start(),
        Action::Stop => session.stop(),
        Action::Resume {
            has_camera,
            permission_granted,
            screen_height_px,
            density,
        } => {
            if session.vm.scanner_active() {
                session.emit(HostEffect::CaptureResume);
            }
            if !has_camera {
                session.vm.on_capture_manager_error(tr("camera.no_camera"));
            } else if !permission_granted {
                session.vm.on_camera_permission_missing();
            } else {
                session.vm.on_camera_permission_granted();
            }
            if let (Some(height), Some(density)) = (screen_height_px, density) {
                session.compact_error = session.config.is_compact(height, density);
            }
        }
        Action::Pause => session.emit(HostEffect::CapturePause),
        Action::ToggleTorch => session.vm.toggle_torch(),
        Action::NavigateUp => session.emit(HostEffect::Finish {
            status: FinishStatus::Canceled,
            result: None,
        }),
        Action::OtherOptions => {
            session.vm.set_scanner_active(false);
            session.dialog = Some(Dialog::OtherOptions);
        }
        Action::OtherOptionSelected { index } => {
            if !matches!(session.dialog, Some(Dialog::OtherOptions)) {
                return Err("options_not_open".into());
            }
            match ChooserChoice::from_index(index) {
                Some(ChooserChoice::WithoutBarcode) => {
                    session.dialog = Some(Dialog::ManualEntry {
                        input: String::new(),
                        edited: false,
                    });
                }
                Some(ChooserChoice::Add(option)) => {
                    session.dialog = None;
                    session.vm.on_add_option_selected(option);
                }
                None => log::warn!("ignoring chooser index {index}"),
            }
        }
        Action::DialogCancel => {
            session.dialog = None;
            session.vm.set_scanner_active(true);
        }
        Action::ManualEntryChanged { input } => {
            if let Some(Dialog::ManualEntry {
                input: current,
                edited,
            }) = session.dialog.as_mut()
            {
                *current = input;
                *edited = true;
            }
        }
        Action::ManualEntrySubmit { input } => {
            let Some(Dialog::ManualEntry {
                input: current,
                edited,
            }) = session.dialog.as_mut()
            else {
                return Err("manual_entry_not_open".into());
            };
            if let Some(input) = input {
                *current = input;
            }
            *edited = true;
            if current.trim().is_empty() {
                log::debug!("manual entry submitted blank");
                return Ok(());
            }
            let card_id = std::mem::take(current);
            session.dialog = None;
            session
                .vm
                .on_parse_result_chosen(ParseResult::barcode_only(card_id, None));
        }
        Action::ManualAddContinue => {
            if !matches!(session.dialog, Some(Dialog::ManualAddWarning)) {
                return Err("manual_add_not_open".into());
            }
            session.dialog = None;
            session.emit(HostEffect::LaunchBarcodeSelector {
                card_id: session.vm.card_id.clone(),
            });
        }
        Action::BarcodeDecoded { text, format } => match CatimaBarcode::from_name(&format) {
            Some(barcode) => {
                session.decoded = true;
                session.vm.on_barcode_result(text, barcode);
            }
            None => log::warn!("ignoring barcode with unsupported format {format}"),
        },
        Action::CaptureError { message } => session.vm.on_capture_manager_error(message),
        Action::PermissionResult {
            request_code,
            granted,
        } => {
            if request_code == CAMERA_PERMISSION_REQUEST_CODE {
                if granted {
                    session.vm.on_camera_permission_granted();
                } else {
                    session.vm.on_camera_permission_missing();
                }
            } else if let Some(source) = ImportSource::from_permission_code(request_code) {
                session.vm.on_storage_permission_result(source, granted);
                if !granted {
                    session.emit(HostEffect::Toast {
                        message: tr("toast.storage_permission_required"),
                    });
                }
            } else {
                log::debug!("ignoring permission result for request code {request_code}");
            }
        }
        Action::PickerLaunchFailed { source } => {
            session.vm.set_scanner_active(true);
            session.emit(HostEffect::Toast {
                message: tr(source.launch_failure_key()),
            });
        }
        Action::ImportResult {
            source,
            canceled,
            fd,
            path,
            candidates,
        } => {
            let mut fd_handle = FdHandle::new(fd);
            if canceled {
                session.vm.set_scanner_active(true);
                return Ok(());
            }

            let collected = read_import_bytes(source, &mut fd_handle, path.as_deref())
                .and_then(|bytes| collect_import_results(bytes.as_deref(), candidates));
            let mut results = match collected {
                Ok(results) => results,
                Err(err) => {
                    session.vm.set_scanner_active(true);
                    return Err(err);
                }
            };
            log::info!("import produced {} result(s)", results.len());
            match results.len() {
                0 => session.vm.set_scanner_active(true),
                1 => {
                    let chosen = results.remove(0);
                    session.vm.on_parse_result_chosen(chosen);
                }
                _ => session.dialog = Some(Dialog::Disambiguator { candidates: results }),
            }
        }
        Action::DisambiguatorChoose { index } => {
            let Some(Dialog::Disambiguator { candidates }) = session.dialog.as_ref() else {
                return Err("disambiguator_not_open".into());
            };
            let chosen = candidates
                .get(index)
                .cloned()
                .ok_or_else(|| format!("disambiguator_index_out_of_range:{index}"))?;
            session.dialog = None;
            session.vm.on_parse_result_chosen(chosen);
        }
        Action::DisambiguatorDismiss => {
            session.dialog = None;
            session.vm.set_scanner_active(true);
        }
        Action::OpenPermissionSettings => {
            if session
                .vm
                .camera_error()
                .is_some_and(|error| error.is_permission_error)
            {
                session.emit(HostEffect::OpenAppSettings);
            }
        }
        Action::Reset | Action::Create { .. } | Action::SaveState | Action::Destroy { .. } => {}
    }
    Ok(())
}

fn respond(state: &mut AppState) -> Value {
    let error = state.last_error.take();
    let Some(session) = state.session.as_mut() else {
        return error_ui(error.as_deref().unwrap_or("no_active_session"));
    };
    let effects = session.take_effects();
    let mut response = json!({
        "type": "Screen",
        "ui": render_scan_screen(session),
        "effects": effects,
    });
    if let Some(error) = error {
        response["error"] = Value::String(error);
    }
    response
}

/// Only pictures are decoded in the core; other sources carry their candidates.
fn read_import_bytes(
    source: Option<ImportSource>,
    fd_handle: &mut FdHandle,
    path: Option<&str>,
) -> Result<Option<Vec<u8>>, String> {
    if source != Some(ImportSource::Image) {
        return Ok(None);
    }
    if let Some(fd) = fd_handle.take() {
        return read_bytes_from_fd(fd as RawFd).map(Some);
    }
    match path {
        Some(path) => std::fs::read(strip_file_uri(path))
            .map(Some)
            .map_err(|e| format!("import_read_failed:{e}")),
        None => Ok(None),
    }
}

fn strip_file_uri(path: &str) -> &str {
    path.strip_prefix("file://").unwrap_or(path)
}

fn read_bytes_from_fd(fd: RawFd) -> Result<Vec<u8>, String> {
    if fd < 0 {
        return Err("invalid_fd".into());
    }

    let mut file = unsafe { File::from_raw_fd(fd) };
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)
        .map_err(|e| format!("import_read_failed:{e}"))?;
    Ok(contents)
}

fn error_ui(message: &str) -> Value {
    json!({
        "type": "Column",
        "padding": 24,
        "children": [
            { "type": "Text", "text": "Error", "size": 18.0 },
            { "type": "Text", "text": message }
        ]
    })
}
