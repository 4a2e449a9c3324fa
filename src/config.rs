//! Voice configuration.
//!
//! A [`VoiceConfig`] describes one offline VITS voice: where its files live,
//! how the ONNX session should run, and the sampling knobs handed to the model.
//! It is created once at startup, either programmatically through
//! [`VoiceConfigBuilder`] or from a JSON file, and validated before the engine
//! is constructed.
//!
//! ```json
//! {
//!   "model": "./model.onnx",
//!   "tokens": "./tokens.txt",
//!   "lexicon": "./lexicon.txt",
//!   "dict_dir": "./dict",
//!   "provider": "cpu",
//!   "num_threads": 2
//! }
//! ```

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::TtsError;

pub const DEFAULT_NUM_THREADS: usize = 2;
pub const DEFAULT_NOISE_SCALE: f32 = 0.667;
pub const DEFAULT_NOISE_SCALE_W: f32 = 0.8;
pub const DEFAULT_LENGTH_SCALE: f32 = 1.0;
pub const DEFAULT_MAX_NUM_SENTENCES: usize = 1;

/// Files espeak-ng needs inside its data directory.
const ESPEAK_DATA_FILES: &[&str] = &["phontab", "phonindex", "phondata", "intonations"];

/// ONNX Runtime execution provider used for inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Cpu,
    Cuda,
    Coreml,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Provider::Cpu => "cpu",
            Provider::Cuda => "cuda",
            Provider::Coreml => "coreml",
        };
        f.write_str(name)
    }
}

/// Configuration for one loaded voice.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(error = "TtsError"))]
pub struct VoiceConfig {
    /// Path to the VITS `.onnx` model.
    pub model: PathBuf,
    /// Path to `tokens.txt` (`symbol id` per line).
    pub tokens: PathBuf,
    /// Path to `lexicon.txt` (`word tok1 tok2 ...` per line).
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
    /// espeak-ng data directory. When set, text is phonemized with espeak-ng.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Jieba dictionary directory shipped with some Chinese voices.
    ///
    /// Accepted for compatibility with existing voice configs and checked for
    /// existence, but its contents are never read: Chinese text is segmented
    /// by a greedy longest match against the lexicon.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub dict_dir: Option<PathBuf>,
    #[builder(default)]
    #[serde(default)]
    pub provider: Provider,
    /// Intra-op threads for ONNX Runtime. Must be at least 1.
    #[builder(default = "DEFAULT_NUM_THREADS")]
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    /// Log model metadata and front-end details while loading and synthesizing.
    #[builder(default)]
    #[serde(default)]
    pub debug: bool,
    #[builder(default = "DEFAULT_NOISE_SCALE")]
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
    #[builder(default = "DEFAULT_NOISE_SCALE_W")]
    #[serde(default = "default_noise_scale_w")]
    pub noise_scale_w: f32,
    /// Base length scale; the per-request speed divides it.
    #[builder(default = "DEFAULT_LENGTH_SCALE")]
    #[serde(default = "default_length_scale")]
    pub length_scale: f32,
    /// Maximum number of sentences handed to the engine in one call.
    #[builder(default = "DEFAULT_MAX_NUM_SENTENCES")]
    #[serde(default = "default_max_num_sentences")]
    pub max_num_sentences: usize,
}

fn default_num_threads() -> usize {
    DEFAULT_NUM_THREADS
}

fn default_noise_scale() -> f32 {
    DEFAULT_NOISE_SCALE
}

fn default_noise_scale_w() -> f32 {
    DEFAULT_NOISE_SCALE_W
}

fn default_length_scale() -> f32 {
    DEFAULT_LENGTH_SCALE
}

fn default_max_num_sentences() -> usize {
    DEFAULT_MAX_NUM_SENTENCES
}

impl From<derive_builder::UninitializedFieldError> for TtsError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        TtsError::Configuration(format!("missing required field `{}`", e.field_name()))
    }
}

impl VoiceConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, TtsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, TtsError> {
        serde_json::from_str(content)
            .map_err(|e| TtsError::Configuration(format!("failed to parse JSON: {e}")))
    }

    /// Check that every referenced file exists and every setting is in range.
    pub fn validate(&self) -> Result<(), TtsError> {
        require_file("model", &self.model)?;
        require_file("tokens", &self.tokens)?;

        if let Some(lexicon) = &self.lexicon {
            require_file("lexicon", lexicon)?;
        }

        if let Some(data_dir) = &self.data_dir {
            require_dir("data_dir", data_dir)?;
            for name in ESPEAK_DATA_FILES {
                let path = data_dir.join(name);
                if !path.is_file() {
                    return Err(TtsError::Configuration(format!(
                        "data_dir {} does not look like espeak-ng data: {} is missing",
                        data_dir.display(),
                        name
                    )));
                }
            }
        }

        if let Some(dict_dir) = &self.dict_dir {
            require_dir("dict_dir", dict_dir)?;
        }

        if self.num_threads == 0 {
            return Err(TtsError::Configuration(
                "num_threads must be at least 1".into(),
            ));
        }

        if self.max_num_sentences == 0 {
            return Err(TtsError::Configuration(
                "max_num_sentences must be at least 1".into(),
            ));
        }

        for (name, value) in [
            ("noise_scale", self.noise_scale),
            ("noise_scale_w", self.noise_scale_w),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TtsError::Configuration(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !self.length_scale.is_finite() || self.length_scale <= 0.0 {
            return Err(TtsError::Configuration(format!(
                "length_scale must be positive, got {}",
                self.length_scale
            )));
        }

        Ok(())
    }
}

fn require_file(field: &str, path: &Path) -> Result<(), TtsError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TtsError::Configuration(format!(
            "{field} file {} does not exist",
            path.display()
        )))
    }
}

fn require_dir(field: &str, path: &Path) -> Result<(), TtsError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(TtsError::Configuration(format!(
            "{field} directory {} does not exist",
            path.display()
        )))
    }
}
