use crate::features::card::ParseResult;
use crate::features::{other_options, render_options_dialog};
use crate::i18n::tr;
use crate::state::{Dialog, ScanSession};
use crate::ui::{
    Button as UiButton, Column as UiColumn, Dialog as UiDialog, ErrorOverlay as UiErrorOverlay,
    MenuItem as UiMenuItem, OptionRow as UiOptionRow, Text as UiText, TextInput as UiTextInput,
    Toolbar as UiToolbar,
};
use serde_json::{json, Value};

pub const CARD_ID_BINDING: &str = "card_id_input";

pub fn render_scan_screen(session: &ScanSession) -> Value {
    let mut children = vec![
        render_toolbar(session),
        json!({
            "type": "CameraPreview",
            "id": "zxing_barcode_scanner",
            "active": session.vm.scanner_active(),
            "torch": session.vm.torch_on(),
            "beep": session.config.beep_enabled,
        }),
        render_error_overlay(session),
    ];

    let more = tr("scan.other_options");
    children.push(
        serde_json::to_value(
            UiButton::new(&more, "other_options")
                .id("fabOtherOptions")
                .icon("ic_more_vert"),
        )
        .unwrap_or(Value::Null),
    );

    if let Some(dialog) = &session.dialog {
        children.push(render_dialog(dialog));
    }

    serde_json::to_value(UiColumn::new(children).content_description("scan_screen"))
        .unwrap_or(Value::Null)
}

fn render_toolbar(session: &ScanSession) -> Value {
    let title = tr("scan.title");
    let mut menu = Vec::new();
    if session.config.has_flash {
        let (label, icon) = if session.vm.torch_on() {
            (tr("menu.torch_off"), "ic_flashlight_on_white_24dp")
        } else {
            (tr("menu.torch_on"), "ic_flashlight_off_white_24dp")
        };
        menu.push(
            serde_json::to_value(
                UiMenuItem::new("action_toggle_flashlight", &label, "toggle_torch").icon(icon),
            )
            .unwrap_or(Value::Null),
        );
    }
    serde_json::to_value(UiToolbar::new(&title).nav_action("navigate_up").menu(menu))
        .unwrap_or(Value::Null)
}

fn render_error_overlay(session: &ScanSession) -> Value {
    let Some(error) = session.vm.camera_error() else {
        return serde_json::to_value(UiErrorOverlay::hidden()).unwrap_or(Value::Null);
    };

    let permission_text = tr("camera.no_permission");
    let message = if error.is_permission_error {
        Some(permission_text.as_str())
    } else {
        error.message.as_deref()
    };
    let title = tr("camera.error_title");
    let mut overlay = UiErrorOverlay::shown(message);
    if !session.compact_error {
        overlay = overlay.header(&title, "ic_no_photography");
    }
    if error.is_permission_error {
        overlay = overlay.action("open_permission_settings");
    }
    serde_json::to_value(overlay).unwrap_or(Value::Null)
}

fn render_dialog(dialog: &Dialog) -> Value {
    match dialog {
        Dialog::OtherOptions => render_options_dialog(&other_options()),
        Dialog::ManualEntry { input, edited } => render_manual_entry(input, *edited),
        Dialog::ManualAddWarning => render_manual_warning(),
        Dialog::Disambiguator { candidates } => render_disambiguator(candidates),
    }
}

fn render_manual_entry(input: &str, edited: bool) -> Value {
    let title = tr("options.without_barcode");
    let prompt = tr("manual_entry.prompt");
    let hint = tr("manual_entry.hint");
    let empty_error = tr("manual_entry.empty_error");
    let ok = tr("common.ok");
    let cancel = tr("common.cancel");
    let valid = !input.trim().is_empty();

    let children = vec![
        serde_json::to_value(UiText::new(&prompt)).unwrap_or(Value::Null),
        serde_json::to_value(
            UiTextInput::new(CARD_ID_BINDING)
                .text(input)
                .hint(&hint)
                .error((edited && !valid).then_some(empty_error.as_str()))
                .action_on_change("manual_entry_changed")
                .single_line(true)
                .request_focus(true),
        )
        .unwrap_or(Value::Null),
    ];

    let dialog = UiDialog::new(&title)
        .children(children)
        .positive(UiButton::new(&ok, "manual_entry_submit").enabled(valid))
        .negative(UiButton::new(&cancel, "dialog_cancel"))
        .cancel_action("dialog_cancel");
    serde_json::to_value(dialog).unwrap_or(Value::Null)
}

fn render_manual_warning() -> Value {
    let title = tr("manual_warning.title");
    let message = tr("manual_warning.message");
    let cont = tr("common.continue");
    let cancel = tr("common.cancel");
    let dialog = UiDialog::new(&title)
        .message(&message)
        .positive(UiButton::new(&cont, "manual_add_continue"))
        .negative(UiButton::new(&cancel, "dialog_cancel"))
        .cancel_action("dialog_cancel");
    serde_json::to_value(dialog).unwrap_or(Value::Null)
}

fn render_disambiguator(candidates: &[ParseResult]) -> Value {
    let title = tr("disambiguator.title");
    let labels: Vec<String> = candidates
        .iter()
        .map(|c| match c.card.barcode_type {
            Some(kind) => format!("{} ({})", c.card.card_id, kind.name()),
            None => c.card.card_id.clone(),
        })
        .collect();
    let rows: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            serde_json::to_value(UiOptionRow::new(label, "disambiguator_choose", index))
                .unwrap_or(Value::Null)
        })
        .collect();
    let dialog = UiDialog::new(&title)
        .children(rows)
        .cancel_action("disambiguator_dismiss");
    serde_json::to_value(dialog).unwrap_or(Value::Null)
}
