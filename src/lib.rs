//! Core of the loyalty-card scan screen.
//!
//! The Android activity forwards lifecycle callbacks, clicks and camera frames
//! over JNI as JSON commands; the core answers with the screen to render and
//! the host effects to perform.

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod features;
mod i18n;
mod logging;
mod router;
mod state;
mod ui;

pub use config::ScanConfig;
pub use features::card::{CatimaBarcode, LoyaltyCard, ParseResult, ParseResultType};
pub use features::decoder::{decode_frame, decode_image_bytes, DecodeError, DecodedBarcode, LumaFrame};
pub use features::view_model::{CameraError, ScanViewModel};
