//! Synthetic QR frames for tests and benches.
use qrcode::{Color, QrCode};

const QUIET_ZONE: u32 = 4;

/// Renders `text` as a QR code with a 4-module quiet zone, `scale` pixels per module.
pub fn qr_luma(text: &str, scale: u32) -> (Vec<u8>, u32, u32) {
    let code = QrCode::new(text.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_ZONE) * scale;
    let mut luma = vec![255u8; (side * side) as usize];
    for y in 0..side {
        for x in 0..side {
            let (mx, my) = (x / scale, y / scale);
            if mx < QUIET_ZONE
                || my < QUIET_ZONE
                || mx >= modules + QUIET_ZONE
                || my >= modules + QUIET_ZONE
            {
                continue;
            }
            let idx = ((my - QUIET_ZONE) * modules + (mx - QUIET_ZONE)) as usize;
            if matches!(colors.get(idx), Some(Color::Dark)) {
                luma[(y * side + x) as usize] = 0;
            }
        }
    }
    (luma, side, side)
}
