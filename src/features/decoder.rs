//! Barcode decoding for camera frames and imported pictures.
//!
//! The heavy lifting is rxing's; this module only prepares luma planes
//! (stride padding, sensor rotation) and maps results onto supported
//! symbologies.
use crate::config::ScanConfig;
use crate::features::card::{CatimaBarcode, ParseResult};
use rxing::common::HybridBinarizer;
use rxing::multi::{GenericMultipleBarcodeReader, MultipleBarcodeReader};
use rxing::{
    BinaryBitmap, DecodeHintValue, DecodeHints, Exceptions, Luma8LuminanceSource,
    MultiFormatReader, RXingResult, Reader,
};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid_dimensions:{width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("frame_too_small:expected {expected} bytes, got {actual}")]
    FrameTooSmall { expected: usize, actual: usize },
    #[error("unsupported_rotation:{0}")]
    UnsupportedRotation(u16),
    #[error("image_load_failed:{0}")]
    Image(#[from] image::ImageError),
    #[error("decoder_failed:{0}")]
    Decoder(String),
}

/// One camera frame as delivered by the capture pipeline (Y plane only).
#[derive(Debug, Clone)]
pub struct LumaFrame<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub row_stride: u32,
    pub rotation_deg: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    pub text: String,
    pub format: CatimaBarcode,
}

pub fn decode_hints(config: &ScanConfig) -> DecodeHints {
    let formats: HashSet<_> = CatimaBarcode::ALL.iter().map(|b| b.format()).collect();
    DecodeHints::default()
        .with(DecodeHintValue::TryHarder(config.try_harder))
        .with(DecodeHintValue::AlsoInverted(config.also_inverted))
        .with(DecodeHintValue::PossibleFormats(formats))
}

/// Decodes a single barcode. `Ok(None)` means nothing was found in the frame.
pub fn decode_frame(
    frame: &LumaFrame<'_>,
    config: &ScanConfig,
) -> Result<Option<DecodedBarcode>, DecodeError> {
    let (luma, width, height) = upright_luma(frame)?;
    let hints = decode_hints(config);

    let source = Luma8LuminanceSource::new(luma, width, height);
    let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));
    let mut reader = MultiFormatReader::default();

    match reader.decode_with_hints(&mut bitmap, &hints) {
        Ok(result) => Ok(to_decoded(&result)),
        Err(Exceptions::NotFoundException(_)) => Ok(None),
        // A located but unreadable code is the same as no code for a live preview.
        Err(Exceptions::ChecksumException(_)) | Err(Exceptions::FormatException(_)) => Ok(None),
        Err(e) => Err(DecodeError::Decoder(format!("{e:?}"))),
    }
}

/// Decodes every supported barcode in an encoded picture (PNG, JPEG, WebP).
pub fn decode_image_bytes(bytes: &[u8]) -> Result<Vec<ParseResult>, DecodeError> {
    let img = image::load_from_memory(bytes)?.to_luma8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    let hints = decode_hints(&ScanConfig::default());
    let source = Luma8LuminanceSource::new(img.into_raw(), width, height);
    let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));
    let mut reader = GenericMultipleBarcodeReader::new(MultiFormatReader::default());

    let found = match reader.decode_multiple_with_hints(&mut bitmap, &hints) {
        Ok(found) => found,
        Err(Exceptions::NotFoundException(_)) => Vec::new(),
        Err(e) => return Err(DecodeError::Decoder(format!("{e:?}"))),
    };

    let mut seen = HashSet::new();
    Ok(found
        .iter()
        .filter_map(to_decoded)
        .filter(|d| seen.insert((d.text.clone(), d.format)))
        .map(|d| ParseResult::barcode_only(d.text, Some(d.format)))
        .collect())
}

fn to_decoded(result: &RXingResult) -> Option<DecodedBarcode> {
    let format = CatimaBarcode::from_format(result.getBarcodeFormat());
    if format.is_none() {
        log::debug!("ignoring unsupported format {:?}", result.getBarcodeFormat());
    }
    format.map(|format| DecodedBarcode {
        text: result.getText().to_string(),
        format,
    })
}

/// Drops stride padding and rotates the plane so the barcode is upright.
fn upright_luma(frame: &LumaFrame<'_>) -> Result<(Vec<u8>, u32, u32), DecodeError> {
    let LumaFrame {
        data,
        width,
        height,
        row_stride,
        rotation_deg,
    } = *frame;

    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }
    let stride = row_stride.max(width) as usize;
    let (w, h) = (width as usize, height as usize);
    // Sizes come straight from the capture pipeline; overflow means a bogus frame.
    let expected = stride
        .checked_mul(h - 1)
        .and_then(|n| n.checked_add(w))
        .filter(|_| w.checked_mul(h).is_some())
        .ok_or(DecodeError::InvalidDimensions { width, height })?;
    if data.len() < expected {
        return Err(DecodeError::FrameTooSmall {
            expected,
            actual: data.len(),
        });
    }

    let packed: Vec<u8> = if stride == w {
        data[..w * h].to_vec()
    } else {
        let mut packed = Vec::with_capacity(w * h);
        for row in 0..h {
            let start = row * stride;
            packed.extend_from_slice(&data[start..start + w]);
        }
        packed
    };

    match rotation_deg % 360 {
        0 => Ok((packed, width, height)),
        90 => Ok((rotate(&packed, w, h, Turn::Quarter), height, width)),
        180 => Ok((rotate(&packed, w, h, Turn::Half), width, height)),
        270 => Ok((rotate(&packed, w, h, Turn::ThreeQuarters), height, width)),
        other => Err(DecodeError::UnsupportedRotation(other)),
    }
}

#[derive(Clone, Copy)]
enum Turn {
    Quarter,
    Half,
    ThreeQuarters,
}

/// Clockwise rotation of a tightly packed `w`x`h` plane.
fn rotate(src: &[u8], w: usize, h: usize, turn: Turn) -> Vec<u8> {
    let mut dst = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let px = src[y * w + x];
            let idx = match turn {
                // new plane is h wide
                Turn::Quarter => x * h + (h - 1 - y),
                Turn::Half => (h - 1 - y) * w + (w - 1 - x),
                Turn::ThreeQuarters => (w - 1 - x) * h + y,
            };
            dst[idx] = px;
        }
    }
    dst
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::qr_fixture::qr_luma;
    use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};

    pub(crate) fn qr_png(text: &str) -> Vec<u8> {
        let (raw, w, h) = qr_luma(text, 6);
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf)
            .write_image(&raw, w, h, ColorType::L8)
            .unwrap();
        buf
    }

    fn frame(data: &[u8], width: u32, height: u32, row_stride: u32, rotation_deg: u16) -> LumaFrame<'_> {
        LumaFrame {
            data,
            width,
            height,
            row_stride,
            rotation_deg,
        }
    }

    #[test]
    fn decodes_plain_qr_frame() {
        let (luma, w, h) = qr_luma("CARD-0042", 4);
        let decoded = decode_frame(&frame(&luma, w, h, w, 0), &ScanConfig::default())
            .unwrap()
            .expect("qr should be found");
        assert_eq!(decoded.text, "CARD-0042");
        assert_eq!(decoded.format, CatimaBarcode::QR_CODE);
    }

    #[test]
    fn decodes_padded_and_rotated_frame() {
        let (luma, w, h) = qr_luma("rotated", 4);
        let rotated = rotate(&luma, w as usize, h as usize, Turn::Quarter);
        // rotated plane is h wide, w tall; pad each row with 16 bytes
        let stride = h + 16;
        let mut padded = Vec::new();
        for row in rotated.chunks(h as usize) {
            padded.extend_from_slice(row);
            padded.extend(std::iter::repeat(0xAA).take(16));
        }
        let decoded = decode_frame(&frame(&padded, h, w, stride, 270), &ScanConfig::default())
            .unwrap()
            .expect("qr should be found after un-rotating");
        assert_eq!(decoded.text, "rotated");
    }

    #[test]
    fn blank_frame_finds_nothing() {
        let blank = vec![255u8; 64 * 48];
        let result = decode_frame(&frame(&blank, 64, 48, 64, 0), &ScanConfig::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn short_buffer_and_odd_rotation_are_rejected() {
        let data = vec![0u8; 10];
        assert!(matches!(
            decode_frame(&frame(&data, 8, 8, 8, 0), &ScanConfig::default()),
            Err(DecodeError::FrameTooSmall { expected: 64, actual: 10 })
        ));
        let data = vec![0u8; 64];
        assert!(matches!(
            decode_frame(&frame(&data, 8, 8, 8, 45), &ScanConfig::default()),
            Err(DecodeError::UnsupportedRotation(45))
        ));
        assert!(matches!(
            decode_frame(&frame(&data, 0, 8, 8, 0), &ScanConfig::default()),
            Err(DecodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn oversized_frame_dimensions_are_an_error() {
        let data = vec![0u8; 16];
        let result = decode_frame(
            &frame(&data, u32::MAX, u32::MAX, u32::MAX, 0),
            &ScanConfig::default(),
        );
        // 64-bit targets report the short buffer; 32-bit ones overflow the size.
        assert!(matches!(
            result,
            Err(DecodeError::FrameTooSmall { .. }) | Err(DecodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn rotations_compose_to_identity() {
        let src: Vec<u8> = (0..6).collect();
        let quarter = rotate(&src, 3, 2, Turn::Quarter);
        assert_eq!(quarter, vec![3, 0, 4, 1, 5, 2]);
        let back = rotate(&quarter, 2, 3, Turn::ThreeQuarters);
        assert_eq!(back, src);
        let half = rotate(&src, 3, 2, Turn::Half);
        assert_eq!(half, vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn decodes_qr_from_png_bytes() {
        let png = qr_png("https://example.org/card/7");
        let results = decode_image_bytes(&png).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].card.card_id, "https://example.org/card/7");
        assert_eq!(results[0].card.barcode_type, Some(CatimaBarcode::QR_CODE));
    }
}
