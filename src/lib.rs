//! # offline-tts
//!
//! Interactive text-to-speech over offline VITS voices.
//!
//! ## Features
//!
//! - **VITS voices**: ONNX models with a token table and either a lexicon or
//!   espeak-ng phonemization (enable the `vits` feature)
//! - **Interactive shell**: prompt for speaker, speed, text and file name in a loop
//! - **16-bit PCM output**: every result is written as a mono WAV file
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! offline-tts = { version = "2026.10", features = ["vits"] }
//! ```
//!
//! ```ignore
//! use std::path::Path;
//! use offline_tts::{engines::vits::VitsEngine, config::VoiceConfigBuilder, Tts};
//!
//! let config = VoiceConfigBuilder::default()
//!     .model("model.onnx")
//!     .tokens("tokens.txt")
//!     .lexicon("lexicon.txt")
//!     .build()?;
//! let mut tts = Tts::<VitsEngine>::new(config)?;
//! tts.generate("Hello, world!", 0, 1.0, Path::new("output/hello.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engines;
pub mod error;
pub mod shell;
pub mod text;
pub mod tts;
pub mod wav;

use std::path::Path;

pub use config::VoiceConfig;
pub use error::TtsError;
pub use tts::{GenerationStats, Tts};

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values in [-1, 1]
    pub samples: Vec<f32>,
    /// Sample rate of the audio, fixed by the loaded voice
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 16-bit PCM WAV file, creating parent directories.
    pub fn write_wav(&self, path: &Path) -> Result<(), TtsError> {
        wav::write_pcm16(path, &self.samples, self.sample_rate)
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// True when the engine produced no audio; such a result is never written.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Common interface for text-to-speech synthesis engines.
///
/// An engine is constructed once per voice and used serially. Its sample rate
/// is fixed for its whole lifetime.
pub trait SynthesisEngine {
    /// Output sample rate of every result this engine produces.
    fn sample_rate(&self) -> u32;

    /// Number of speakers embedded in the voice. Single-speaker voices return 1.
    fn num_speakers(&self) -> usize {
        1
    }

    /// Synthesize speech for one piece of text.
    ///
    /// An empty `samples` buffer is a valid return value here; callers decide
    /// how to treat it.
    fn synthesize(
        &mut self,
        text: &str,
        speaker_id: u32,
        speed: f32,
    ) -> Result<SynthesisResult, TtsError>;
}

/// Engines that can build themselves from a [`VoiceConfig`].
pub trait LoadableEngine: SynthesisEngine + Sized {
    /// Construct the engine. The configuration has already been validated.
    fn load(config: &VoiceConfig) -> Result<Self, TtsError>;
}
