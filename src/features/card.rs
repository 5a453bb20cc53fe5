use rxing::BarcodeFormat;
use serde::{Deserialize, Serialize};

/// Barcode symbologies a stored card can carry.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatimaBarcode {
    AZTEC,
    CODABAR,
    CODE_39,
    CODE_93,
    CODE_128,
    DATA_MATRIX,
    EAN_8,
    EAN_13,
    ITF,
    PDF_417,
    QR_CODE,
    UPC_A,
    UPC_E,
}

impl CatimaBarcode {
    pub const ALL: [CatimaBarcode; 13] = [
        CatimaBarcode::AZTEC,
        CatimaBarcode::CODABAR,
        CatimaBarcode::CODE_39,
        CatimaBarcode::CODE_93,
        CatimaBarcode::CODE_128,
        CatimaBarcode::DATA_MATRIX,
        CatimaBarcode::EAN_8,
        CatimaBarcode::EAN_13,
        CatimaBarcode::ITF,
        CatimaBarcode::PDF_417,
        CatimaBarcode::QR_CODE,
        CatimaBarcode::UPC_A,
        CatimaBarcode::UPC_E,
    ];

    /// Decoder formats outside the supported set map to `None`.
    pub fn from_format(format: &BarcodeFormat) -> Option<Self> {
        let mapped = match format {
            BarcodeFormat::AZTEC => CatimaBarcode::AZTEC,
            BarcodeFormat::CODABAR => CatimaBarcode::CODABAR,
            BarcodeFormat::CODE_39 => CatimaBarcode::CODE_39,
            BarcodeFormat::CODE_93 => CatimaBarcode::CODE_93,
            BarcodeFormat::CODE_128 => CatimaBarcode::CODE_128,
            BarcodeFormat::DATA_MATRIX => CatimaBarcode::DATA_MATRIX,
            BarcodeFormat::EAN_8 => CatimaBarcode::EAN_8,
            BarcodeFormat::EAN_13 => CatimaBarcode::EAN_13,
            BarcodeFormat::ITF => CatimaBarcode::ITF,
            BarcodeFormat::PDF_417 => CatimaBarcode::PDF_417,
            BarcodeFormat::QR_CODE => CatimaBarcode::QR_CODE,
            BarcodeFormat::UPC_A => CatimaBarcode::UPC_A,
            BarcodeFormat::UPC_E => CatimaBarcode::UPC_E,
            _ => return None,
        };
        Some(mapped)
    }

    pub fn format(self) -> BarcodeFormat {
        match self {
            CatimaBarcode::AZTEC => BarcodeFormat::AZTEC,
            CatimaBarcode::CODABAR => BarcodeFormat::CODABAR,
            CatimaBarcode::CODE_39 => BarcodeFormat::CODE_39,
            CatimaBarcode::CODE_93 => BarcodeFormat::CODE_93,
            CatimaBarcode::CODE_128 => BarcodeFormat::CODE_128,
            CatimaBarcode::DATA_MATRIX => BarcodeFormat::DATA_MATRIX,
            CatimaBarcode::EAN_8 => BarcodeFormat::EAN_8,
            CatimaBarcode::EAN_13 => BarcodeFormat::EAN_13,
            CatimaBarcode::ITF => BarcodeFormat::ITF,
            CatimaBarcode::PDF_417 => BarcodeFormat::PDF_417,
            CatimaBarcode::QR_CODE => BarcodeFormat::QR_CODE,
            CatimaBarcode::UPC_A => BarcodeFormat::UPC_A,
            CatimaBarcode::UPC_E => BarcodeFormat::UPC_E,
        }
    }

    /// Parses the wire name the host uses, e.g. `"EAN_13"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            CatimaBarcode::AZTEC => "AZTEC",
            CatimaBarcode::CODABAR => "CODABAR",
            CatimaBarcode::CODE_39 => "CODE_39",
            CatimaBarcode::CODE_93 => "CODE_93",
            CatimaBarcode::CODE_128 => "CODE_128",
            CatimaBarcode::DATA_MATRIX => "DATA_MATRIX",
            CatimaBarcode::EAN_8 => "EAN_8",
            CatimaBarcode::EAN_13 => "EAN_13",
            CatimaBarcode::ITF => "ITF",
            CatimaBarcode::PDF_417 => "PDF_417",
            CatimaBarcode::QR_CODE => "QR_CODE",
            CatimaBarcode::UPC_A => "UPC_A",
            CatimaBarcode::UPC_E => "UPC_E",
        }
    }
}

/// The part of a loyalty card this screen can fill in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoyaltyCard {
    pub card_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_type: Option<CatimaBarcode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseResultType {
    Full,
    BarcodeOnly,
}

/// A card candidate handed back to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub kind: ParseResultType,
    pub card: LoyaltyCard,
}

impl ParseResult {
    pub fn barcode_only(card_id: impl Into<String>, barcode_type: Option<CatimaBarcode>) -> Self {
        Self {
            kind: ParseResultType::BarcodeOnly,
            card: LoyaltyCard {
                card_id: card_id.into(),
                barcode_type,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_formats_do_not_map() {
        assert_eq!(CatimaBarcode::from_format(&BarcodeFormat::MAXICODE), None);
        assert_eq!(CatimaBarcode::from_format(&BarcodeFormat::RSS_14), None);
        assert_eq!(
            CatimaBarcode::from_format(&BarcodeFormat::EAN_13),
            Some(CatimaBarcode::EAN_13)
        );
    }

    #[test]
    fn every_symbology_maps_back_to_itself() {
        for b in CatimaBarcode::ALL {
            assert_eq!(CatimaBarcode::from_format(&b.format()), Some(b));
            assert_eq!(CatimaBarcode::from_name(b.name()), Some(b));
        }
        assert_eq!(CatimaBarcode::from_name("ean_13"), None);
    }

    #[test]
    fn parse_result_serializes_with_wire_names() {
        let result = ParseResult::barcode_only("123", Some(CatimaBarcode::CODE_128));
        let val = serde_json::to_value(&result).unwrap();
        assert_eq!(val["kind"], "BARCODE_ONLY");
        assert_eq!(val["card"]["barcode_type"], "CODE_128");
        assert_eq!(val["card"]["card_id"], "123");

        let no_type = serde_json::to_value(ParseResult::barcode_only("x", None)).unwrap();
        assert!(no_type["card"].get("barcode_type").is_none());
    }
}
