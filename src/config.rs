use serde::Deserialize;

/// Request code for reading an image to import a card from.
pub const PERMISSION_SCAN_ADD_FROM_IMAGE: i32 = 100;
/// Request code for reading a PDF to import a card from.
pub const PERMISSION_SCAN_ADD_FROM_PDF: i32 = 101;
/// Request code for reading a pass file to import a card from.
pub const PERMISSION_SCAN_ADD_FROM_PKPASS: i32 = 102;

/// Code the capture engine uses for its own camera permission prompt.
/// Only ever compared against, never requested by this core.
pub const CAMERA_PERMISSION_REQUEST_CODE: i32 = 250;

/// Bundle key under which the scanner flag survives recreation.
pub const SAVED_SCANNER_ACTIVE_KEY: &str = "scannerActive";

/// Launch extras keys, shared with the card editor.
pub const EXTRA_CARD_ID: &str = "cardId";
pub const EXTRA_ADD_GROUP: &str = "addGroup";

pub const DEFAULT_MEDIUM_SCALE_FACTOR_DIP: u32 = 460;

/// Host-supplied knobs for one scan screen. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub has_flash: bool,
    pub medium_scale_factor_dip: u32,
    pub beep_enabled: bool,
    pub also_inverted: bool,
    pub try_harder: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            has_flash: false,
            medium_scale_factor_dip: DEFAULT_MEDIUM_SCALE_FACTOR_DIP,
            beep_enabled: false,
            also_inverted: true,
            try_harder: true,
        }
    }
}

impl ScanConfig {
    /// Whether the camera error overlay should drop its icon and title.
    pub fn is_compact(&self, screen_height_px: f64, density: f64) -> bool {
        let medium_px = f64::from(self.medium_scale_factor_dip) * density.max(0.0);
        screen_height_px < medium_px
    }
}
