//! Tesseract invocation options.
//!
//! The selectable values are closed sets; anything else is rejected before
//! the engine is ever started.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing user-supplied OCR options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("unsupported page segmentation mode: {0} (expected one of 3, 4, 6, 7, 11, 12, 13)")]
    SegmentationMode(String),

    #[error("unsupported OCR engine mode: {0} (expected 1 or 3)")]
    EngineMode(String),

    #[error("unsupported language: {0} (expected one of eng, deu, fra, spa, ita)")]
    Language(String),
}

/// OCR engine mode (`--oem`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EngineMode {
    /// LSTM neural network only.
    LstmOnly,
    /// LSTM plus the legacy engine.
    #[default]
    LstmPlusLegacy,
}

impl EngineMode {
    pub const ALL: [EngineMode; 2] = [EngineMode::LstmOnly, EngineMode::LstmPlusLegacy];

    pub fn code(&self) -> u8 {
        match self {
            EngineMode::LstmOnly => 1,
            EngineMode::LstmPlusLegacy => 3,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, OptionsError> {
        match code {
            1 => Ok(EngineMode::LstmOnly),
            3 => Ok(EngineMode::LstmPlusLegacy),
            other => Err(OptionsError::EngineMode(other.to_string())),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EngineMode::LstmOnly => "LSTM neural network only",
            EngineMode::LstmPlusLegacy => "Default: LSTM + legacy engine (best accuracy)",
        }
    }
}

/// Page segmentation mode (`--psm`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SegmentationMode {
    #[default]
    Auto,
    SingleColumn,
    SingleBlock,
    SingleLine,
    SparseText,
    SparseTextOsd,
    RawLine,
}

impl SegmentationMode {
    pub const ALL: [SegmentationMode; 7] = [
        SegmentationMode::Auto,
        SegmentationMode::SingleColumn,
        SegmentationMode::SingleBlock,
        SegmentationMode::SingleLine,
        SegmentationMode::SparseText,
        SegmentationMode::SparseTextOsd,
        SegmentationMode::RawLine,
    ];

    pub fn code(&self) -> u8 {
        match self {
            SegmentationMode::Auto => 3,
            SegmentationMode::SingleColumn => 4,
            SegmentationMode::SingleBlock => 6,
            SegmentationMode::SingleLine => 7,
            SegmentationMode::SparseText => 11,
            SegmentationMode::SparseTextOsd => 12,
            SegmentationMode::RawLine => 13,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, OptionsError> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.code() == code)
            .ok_or_else(|| OptionsError::SegmentationMode(code.to_string()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            SegmentationMode::Auto => "Fully automatic page segmentation (Default)",
            SegmentationMode::SingleColumn => "Assume a single column of text",
            SegmentationMode::SingleBlock => "Assume a single uniform block of text",
            SegmentationMode::SingleLine => "Treat image as a single text line",
            SegmentationMode::SparseText => "Sparse text with no specific orientation",
            SegmentationMode::SparseTextOsd => "Dense text with no specific orientation",
            SegmentationMode::RawLine => "Raw line with default orientation",
        }
    }
}

/// Recognition language (`-l`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    German,
    French,
    Spanish,
    Italian,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::German,
        Language::French,
        Language::Spanish,
        Language::Italian,
    ];

    /// Tesseract language pack code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "eng",
            Language::German => "deu",
            Language::French => "fra",
            Language::Spanish => "spa",
            Language::Italian => "ita",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::German => "German",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::Italian => "Italian",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, OptionsError> {
        let code = code.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or(OptionsError::Language(code))
    }
}

macro_rules! numeric_option_impls {
    ($ty:ty, $err:path) => {
        impl FromStr for $ty {
            type Err = OptionsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let code = s.trim().parse::<u8>().map_err(|_| $err(s.to_string()))?;
                Self::from_code(code)
            }
        }

        impl TryFrom<u8> for $ty {
            type Error = OptionsError;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                Self::from_code(code)
            }
        }

        impl From<$ty> for u8 {
            fn from(value: $ty) -> u8 {
                value.code()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

numeric_option_impls!(EngineMode, OptionsError::EngineMode);
numeric_option_impls!(SegmentationMode, OptionsError::SegmentationMode);

impl FromStr for Language {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for Language {
    type Error = OptionsError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::from_code(&code)
    }
}

impl From<Language> for String {
    fn from(value: Language) -> String {
        value.code().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Options for one recognition call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OcrOptions {
    pub engine_mode: EngineMode,
    pub segmentation_mode: SegmentationMode,
    pub language: Language,
}

impl OcrOptions {
    pub fn new(
        engine_mode: EngineMode,
        segmentation_mode: SegmentationMode,
        language: Language,
    ) -> Self {
        Self {
            engine_mode,
            segmentation_mode,
            language,
        }
    }

    /// Command-line arguments for the engine. The language flag is left out
    /// for English, which is Tesseract's own default.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--oem".to_string(),
            self.engine_mode.code().to_string(),
            "--psm".to_string(),
            self.segmentation_mode.code().to_string(),
        ];
        if self.language != Language::English {
            args.push("-l".to_string());
            args.push(self.language.code().to_string());
        }
        args
    }

    /// Flag string in the form Tesseract documents it, e.g. `--oem 1 --psm 6 -l deu`.
    pub fn config_string(&self) -> String {
        self.args().join(" ")
    }
}

/// Build the engine flag string from raw option values.
pub fn build_config(oem: u8, psm: u8, lang: &str) -> Result<String, OptionsError> {
    Ok(OcrOptions::new(
        EngineMode::from_code(oem)?,
        SegmentationMode::from_code(psm)?,
        Language::from_code(lang)?,
    )
    .config_string())
}
