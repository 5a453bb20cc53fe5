pub mod card;
pub mod decoder;
pub mod events;
pub mod import;
pub mod observable;
#[cfg(test)]
pub(crate) mod qr_fixture;
pub(crate) mod scan_screen;
pub mod view_model;

use crate::i18n::tr;
use serde_json::Value;

/// Alternative entry paths handled by the state holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOption {
    ManualAdd,
    FromImage,
    FromPdf,
    FromPkpass,
}

impl AddOption {
    /// Maps the chooser's 1-based numbering; anything else has no option.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(AddOption::ManualAdd),
            2 => Some(AddOption::FromImage),
            3 => Some(AddOption::FromPdf),
            4 => Some(AddOption::FromPkpass),
            _ => None,
        }
    }
}

/// A row of the "other options" chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChooserChoice {
    /// Type a card id for a card that has no barcode at all.
    WithoutBarcode,
    Add(AddOption),
}

impl ChooserChoice {
    pub fn from_index(index: usize) -> Option<Self> {
        if index == 0 {
            Some(ChooserChoice::WithoutBarcode)
        } else {
            AddOption::from_index(index).map(ChooserChoice::Add)
        }
    }
}

/// Display record for one chooser row. Built fresh every time the chooser opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCardOption {
    pub label: String,
    pub icon: &'static str,
}

impl AddCardOption {
    fn new(key: &str, icon: &'static str) -> Self {
        Self {
            label: tr(key),
            icon,
        }
    }
}

pub fn other_options() -> Vec<AddCardOption> {
    vec![
        AddCardOption::new("options.without_barcode", "baseline_block_24"),
        AddCardOption::new("options.manually", "ic_edit"),
        AddCardOption::new("options.from_image", "baseline_image_24"),
        AddCardOption::new("options.from_pdf", "baseline_picture_as_pdf_24"),
        AddCardOption::new("options.from_pkpass", "local_activity_24px"),
    ]
}

/// Render the chooser dialog from the option catalog.
pub fn render_options_dialog(options: &[AddCardOption]) -> Value {
    use crate::ui::{Button as UiButton, Dialog as UiDialog, OptionRow as UiOptionRow};

    let rows: Vec<Value> = options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            serde_json::to_value(
                UiOptionRow::new(&option.label, "other_option_selected", index).icon(option.icon),
            )
            .unwrap_or(Value::Null)
        })
        .collect();

    let title = tr("options.title");
    let cancel = tr("common.cancel");
    let dialog = UiDialog::new(&title)
        .children(rows)
        .negative(UiButton::new(&cancel, "dialog_cancel"))
        .cancel_action("dialog_cancel");
    serde_json::to_value(dialog).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chooser_rows_map_to_choices() {
        assert_eq!(ChooserChoice::from_index(0), Some(ChooserChoice::WithoutBarcode));
        assert_eq!(
            ChooserChoice::from_index(3),
            Some(ChooserChoice::Add(AddOption::FromPdf))
        );
        assert_eq!(ChooserChoice::from_index(5), None);
    }

    #[test]
    fn catalog_has_five_rows_in_chooser_order() {
        let options = other_options();
        let icons: Vec<_> = options.iter().map(|o| o.icon).collect();
        assert_eq!(
            icons,
            vec![
                "baseline_block_24",
                "ic_edit",
                "baseline_image_24",
                "baseline_picture_as_pdf_24",
                "local_activity_24px"
            ]
        );
        assert!(options.iter().all(|o| !o.label.is_empty()));
    }

    #[test]
    fn dialog_rows_carry_their_index() {
        let dialog = render_options_dialog(&other_options());
        let rows = dialog["children"].as_array().unwrap();
        assert_eq!(rows.len(), 5);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row["index"], i);
            assert_eq!(row["action"], "other_option_selected");
        }
        assert_eq!(dialog["cancel_action"], "dialog_cancel");
    }
}
