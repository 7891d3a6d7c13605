use std::fmt;

use serde::{Deserialize, Serialize};

/// Code formats a decode engine can be asked to recognise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Symbology {
    QrCode,
    Aztec,
    Codabar,
    #[serde(rename = "CODE_39")]
    Code39,
    #[serde(rename = "CODE_93")]
    Code93,
    #[serde(rename = "CODE_128")]
    Code128,
    DataMatrix,
    Maxicode,
    Itf,
    #[serde(rename = "EAN_13")]
    Ean13,
    #[serde(rename = "EAN_8")]
    Ean8,
    #[serde(rename = "PDF_417")]
    Pdf417,
    #[serde(rename = "RSS_14")]
    Rss14,
    RssExpanded,
    UpcA,
    UpcE,
    UpcEanExtension,
}

impl Symbology {
    pub const ALL: [Symbology; 17] = [
        Symbology::QrCode,
        Symbology::Aztec,
        Symbology::Codabar,
        Symbology::Code39,
        Symbology::Code93,
        Symbology::Code128,
        Symbology::DataMatrix,
        Symbology::Maxicode,
        Symbology::Itf,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Pdf417,
        Symbology::Rss14,
        Symbology::RssExpanded,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::UpcEanExtension,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Symbology::QrCode => "QR_CODE",
            Symbology::Aztec => "AZTEC",
            Symbology::Codabar => "CODABAR",
            Symbology::Code39 => "CODE_39",
            Symbology::Code93 => "CODE_93",
            Symbology::Code128 => "CODE_128",
            Symbology::DataMatrix => "DATA_MATRIX",
            Symbology::Maxicode => "MAXICODE",
            Symbology::Itf => "ITF",
            Symbology::Ean13 => "EAN_13",
            Symbology::Ean8 => "EAN_8",
            Symbology::Pdf417 => "PDF_417",
            Symbology::Rss14 => "RSS_14",
            Symbology::RssExpanded => "RSS_EXPANDED",
            Symbology::UpcA => "UPC_A",
            Symbology::UpcE => "UPC_E",
            Symbology::UpcEanExtension => "UPC_EAN_EXTENSION",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|symbology| symbology.name() == name)
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pixel size of the area of interest inside the video frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanRegion {
    pub width: u32,
    pub height: u32,
}

/// Configuration handed to [`DecodeEngine::start`](super::DecodeEngine::start).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DecodeOptions {
    /// Decode attempts per second.
    pub target_frame_rate: u32,
    pub scan_region: Option<ScanRegion>,
    pub preferred_aspect_ratio: Option<f32>,
    /// Skip the mirrored-frame retry some engines perform.
    pub disable_flip: bool,
    pub remember_last_used_device: bool,
    pub expose_torch_control_if_available: bool,
    /// `None` accepts every symbology the engine knows.
    pub accepted_symbologies: Option<Vec<Symbology>>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            target_frame_rate: 10,
            scan_region: Some(ScanRegion {
                width: 250,
                height: 250,
            }),
            preferred_aspect_ratio: None,
            disable_flip: false,
            remember_last_used_device: true,
            expose_torch_control_if_available: true,
            accepted_symbologies: None,
        }
    }
}

impl DecodeOptions {
    pub fn accepts(&self, symbology: Symbology) -> bool {
        self.accepted_symbologies
            .as_ref()
            .map_or(true, |accepted| accepted.contains(&symbology))
    }
}
