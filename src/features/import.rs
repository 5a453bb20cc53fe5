use crate::config::{
    PERMISSION_SCAN_ADD_FROM_IMAGE, PERMISSION_SCAN_ADD_FROM_PDF, PERMISSION_SCAN_ADD_FROM_PKPASS,
};
use crate::features::card::{CatimaBarcode, ParseResult};
use crate::features::decoder::decode_image_bytes;
use crate::features::events::ScanEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Files a card can be imported from instead of the live camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportSource {
    Image,
    Pdf,
    Pkpass,
}

impl ImportSource {
    pub fn permission_code(self) -> i32 {
        match self {
            ImportSource::Image => PERMISSION_SCAN_ADD_FROM_IMAGE,
            ImportSource::Pdf => PERMISSION_SCAN_ADD_FROM_PDF,
            ImportSource::Pkpass => PERMISSION_SCAN_ADD_FROM_PKPASS,
        }
    }

    pub fn from_permission_code(code: i32) -> Option<Self> {
        match code {
            PERMISSION_SCAN_ADD_FROM_IMAGE => Some(ImportSource::Image),
            PERMISSION_SCAN_ADD_FROM_PDF => Some(ImportSource::Pdf),
            PERMISSION_SCAN_ADD_FROM_PKPASS => Some(ImportSource::Pkpass),
            _ => None,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "image" => Some(ImportSource::Image),
            "pdf" => Some(ImportSource::Pdf),
            "pkpass" => Some(ImportSource::Pkpass),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImportSource::Image => "image/*",
            ImportSource::Pdf => "application/pdf",
            ImportSource::Pkpass => "application/*",
        }
    }

    /// Translation key for the picker chooser title.
    pub fn chooser_title_key(self) -> &'static str {
        match self {
            ImportSource::Image => "options.from_image",
            ImportSource::Pdf => "options.from_pdf",
            ImportSource::Pkpass => "options.from_pkpass",
        }
    }

    /// Translation key shown when no app can handle the picker.
    pub fn launch_failure_key(self) -> &'static str {
        match self {
            ImportSource::Image => "toast.failed_launching_photo_picker",
            ImportSource::Pdf | ImportSource::Pkpass => "toast.failed_launching_file_manager",
        }
    }

    pub fn picker_event(self) -> ScanEvent {
        match self {
            ImportSource::Image => ScanEvent::LaunchImagePicker,
            ImportSource::Pdf => ScanEvent::LaunchPdfPicker,
            ImportSource::Pkpass => ScanEvent::LaunchPkpassPicker,
        }
    }
}

/// A candidate the host already extracted from a PDF or pass file.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportCandidate {
    pub card_id: String,
    #[serde(default)]
    pub barcode_type: Option<String>,
}

impl ImportCandidate {
    pub fn into_parse_result(self) -> ParseResult {
        let barcode_type = self.barcode_type.as_deref().and_then(CatimaBarcode::from_name);
        ParseResult::barcode_only(self.card_id, barcode_type)
    }
}

/// Collects parse results for a finished picker.
///
/// Picture bytes are decoded here; PDF, pass file and barcode selector
/// results arrive as host-supplied candidates.
pub fn collect_import_results(
    image_bytes: Option<&[u8]>,
    candidates: Vec<ImportCandidate>,
) -> Result<Vec<ParseResult>, String> {
    let mut results: Vec<ParseResult> = candidates
        .into_iter()
        .filter(|c| !c.card_id.is_empty())
        .map(ImportCandidate::into_parse_result)
        .collect();

    if let Some(bytes) = image_bytes {
        let decoded = decode_image_bytes(bytes).map_err(|e| format!("import_decode_failed:{e}"))?;
        results.extend(decoded);
    }

    let mut seen = HashSet::new();
    results.retain(|r| seen.insert((r.card.card_id.clone(), r.card.barcode_type)));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_codes_round_trip() {
        for source in [ImportSource::Image, ImportSource::Pdf, ImportSource::Pkpass] {
            assert_eq!(
                ImportSource::from_permission_code(source.permission_code()),
                Some(source)
            );
        }
        assert_eq!(ImportSource::from_permission_code(250), None);
    }

    #[test]
    fn pdf_and_pkpass_share_file_manager_failure() {
        assert_eq!(
            ImportSource::Pdf.launch_failure_key(),
            ImportSource::Pkpass.launch_failure_key()
        );
        assert_ne!(
            ImportSource::Image.launch_failure_key(),
            ImportSource::Pdf.launch_failure_key()
        );
        assert_eq!(ImportSource::Pkpass.mime_type(), "application/*");
    }

    #[test]
    fn candidates_are_deduplicated_and_blank_ids_dropped() {
        let candidates = vec![
            ImportCandidate { card_id: "42".into(), barcode_type: Some("QR_CODE".into()) },
            ImportCandidate { card_id: "42".into(), barcode_type: Some("QR_CODE".into()) },
            ImportCandidate { card_id: "42".into(), barcode_type: Some("bogus".into()) },
            ImportCandidate { card_id: String::new(), barcode_type: None },
        ];
        let results = collect_import_results(None, candidates).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].card.barcode_type, Some(CatimaBarcode::QR_CODE));
        assert_eq!(results[1].card.barcode_type, None);
    }

    #[test]
    fn undecodable_image_is_an_error() {
        let err = collect_import_results(Some(b"not an image"), Vec::new())
            .unwrap_err();
        assert!(err.starts_with("import_decode_failed:"));
    }
}
