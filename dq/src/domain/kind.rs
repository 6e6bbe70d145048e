//! Operation kinds and their input cardinality

use serde::{Deserialize, Serialize};

use super::error::OperationError;

/// How many input documents an operation kind accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    ExactlyOne,
    AtLeastOne,
}

impl Cardinality {
    /// Check whether `count` inputs satisfy this cardinality
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Self::ExactlyOne => count == 1,
            Self::AtLeastOne => count >= 1,
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactlyOne => write!(f, "exactly one"),
            Self::AtLeastOne => write!(f, "at least one"),
        }
    }
}

/// The closed set of document operations the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Merge,
    Split,
    Watermark,
    Rotate,
    Compress,
    Extract,
    Reorder,
    Grayscale,
    Encrypt,
    Decrypt,
    Sanitize,
    FillForms,
    ImageToPdf,
    PageToImage,
    Ocr,
}

impl OperationKind {
    /// Every known kind, in display order
    pub const ALL: [OperationKind; 15] = [
        Self::Merge,
        Self::Split,
        Self::Watermark,
        Self::Rotate,
        Self::Compress,
        Self::Extract,
        Self::Reorder,
        Self::Grayscale,
        Self::Encrypt,
        Self::Decrypt,
        Self::Sanitize,
        Self::FillForms,
        Self::ImageToPdf,
        Self::PageToImage,
        Self::Ocr,
    ];

    /// Input cardinality required by this kind
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::Merge | Self::Watermark | Self::Rotate | Self::Compress => Cardinality::AtLeastOne,
            Self::Split
            | Self::Extract
            | Self::Reorder
            | Self::Grayscale
            | Self::Encrypt
            | Self::Decrypt
            | Self::Sanitize
            | Self::FillForms
            | Self::ImageToPdf
            | Self::PageToImage
            | Self::Ocr => Cardinality::ExactlyOne,
        }
    }

    /// Kebab-case name, as used in manifests and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Split => "split",
            Self::Watermark => "watermark",
            Self::Rotate => "rotate",
            Self::Compress => "compress",
            Self::Extract => "extract",
            Self::Reorder => "reorder",
            Self::Grayscale => "grayscale",
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::Sanitize => "sanitize",
            Self::FillForms => "fill-forms",
            Self::ImageToPdf => "image-to-pdf",
            Self::PageToImage => "page-to-image",
            Self::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OperationKind {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| OperationError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("merge".parse::<OperationKind>().unwrap(), OperationKind::Merge);
        assert_eq!("SPLIT".parse::<OperationKind>().unwrap(), OperationKind::Split);
        assert_eq!("Page-To-Image".parse::<OperationKind>().unwrap(), OperationKind::PageToImage);
        assert!(matches!(
            "translate".parse::<OperationKind>(),
            Err(OperationError::UnknownKind(name)) if name == "translate"
        ));
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.to_string().parse::<OperationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_cardinality_per_kind() {
        assert_eq!(OperationKind::Merge.cardinality(), Cardinality::AtLeastOne);
        assert_eq!(OperationKind::Compress.cardinality(), Cardinality::AtLeastOne);
        assert_eq!(OperationKind::Split.cardinality(), Cardinality::ExactlyOne);
        assert_eq!(OperationKind::Extract.cardinality(), Cardinality::ExactlyOne);
        assert_eq!(OperationKind::Reorder.cardinality(), Cardinality::ExactlyOne);
        assert_eq!(OperationKind::Encrypt.cardinality(), Cardinality::ExactlyOne);
        assert_eq!(OperationKind::FillForms.cardinality(), Cardinality::ExactlyOne);
        assert_eq!(OperationKind::ImageToPdf.cardinality(), Cardinality::ExactlyOne);
        assert_eq!(OperationKind::Ocr.cardinality(), Cardinality::ExactlyOne);
    }

    #[test]
    fn test_cardinality_accepts() {
        assert!(Cardinality::ExactlyOne.accepts(1));
        assert!(!Cardinality::ExactlyOne.accepts(0));
        assert!(!Cardinality::ExactlyOne.accepts(2));
        assert!(Cardinality::AtLeastOne.accepts(1));
        assert!(Cardinality::AtLeastOne.accepts(7));
        assert!(!Cardinality::AtLeastOne.accepts(0));
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&OperationKind::Watermark).unwrap();
        assert_eq!(json, "\"watermark\"");

        let kind: OperationKind = serde_json::from_str("\"grayscale\"").unwrap();
        assert_eq!(kind, OperationKind::Grayscale);

        let json = serde_json::to_string(&OperationKind::ImageToPdf).unwrap();
        assert_eq!(json, "\"image-to-pdf\"");
    }
}
