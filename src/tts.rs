//! Synthesis facade.
//!
//! [`Tts`] owns one voice for the lifetime of the process: its configuration,
//! the engine handle and the engine's fixed sample rate. Every request goes
//! through [`Tts::synthesize`] or [`Tts::generate`]; an engine that produces no
//! samples is logged and reported as `Ok(None)` rather than as an error.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::{LoadableEngine, SynthesisEngine, SynthesisResult, TtsError, VoiceConfig};

/// Timing statistics for one successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    pub num_samples: usize,
    pub sample_rate: u32,
    /// Wall-clock time spent inside the engine.
    pub elapsed: Duration,
    /// Where the audio was written, if it was written.
    pub output: Option<PathBuf>,
}

impl GenerationStats {
    pub fn audio_duration_secs(&self) -> f64 {
        self.num_samples as f64 / self.sample_rate as f64
    }

    /// Wall-clock time divided by audio duration. Below 1.0 is faster than real time.
    pub fn real_time_factor(&self) -> f64 {
        self.elapsed.as_secs_f64() / self.audio_duration_secs()
    }
}

/// A loaded voice ready to serve sequential requests.
pub struct Tts<E: SynthesisEngine> {
    config: VoiceConfig,
    engine: E,
    sample_rate: u32,
}

impl<E: LoadableEngine> Tts<E> {
    /// Validate `config` and load the engine eagerly.
    pub fn new(config: VoiceConfig) -> Result<Self, TtsError> {
        config.validate()?;
        let engine = E::load(&config)?;
        Ok(Self::with_engine(config, engine))
    }
}

impl<E: SynthesisEngine> Tts<E> {
    /// Wrap an engine that has already been constructed for `config`.
    pub fn with_engine(config: VoiceConfig, engine: E) -> Self {
        let sample_rate = engine.sample_rate();
        log::info!(
            "Voice ready: {} ({}Hz, {} speaker(s))",
            config.model.display(),
            sample_rate,
            engine.num_speakers()
        );
        Self {
            config,
            engine,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_speakers(&self) -> usize {
        self.engine.num_speakers()
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Hand `text` to the engine in a single call and time it.
    ///
    /// Returns `Ok(None)` when the engine produced no samples.
    pub fn synthesize(
        &mut self,
        text: &str,
        speaker_id: u32,
        speed: f32,
    ) -> Result<Option<(SynthesisResult, GenerationStats)>, TtsError> {
        log::info!("Generating speech for text: {text} | speed: {speed} | speaker id: {speaker_id}");

        let start = Instant::now();
        let result = self.engine.synthesize(text, speaker_id, speed)?;
        let elapsed = start.elapsed();

        if result.sample_rate != self.sample_rate {
            return Err(TtsError::Metadata(format!(
                "engine returned {}Hz audio, voice was loaded at {}Hz",
                result.sample_rate, self.sample_rate
            )));
        }

        if result.is_empty() {
            log::error!("Error: No audio samples generated.");
            return Ok(None);
        }

        let stats = GenerationStats {
            num_samples: result.samples.len(),
            sample_rate: result.sample_rate,
            elapsed,
            output: None,
        };
        log::info!(
            "Audio generated successfully. Duration: {:.2}s | Generation Time: {:.2}s | Real-time factor: {:.2}",
            stats.audio_duration_secs(),
            stats.elapsed.as_secs_f64(),
            stats.real_time_factor()
        );
        Ok(Some((result, stats)))
    }

    /// Synthesize `text` and write it to `output` as 16-bit PCM.
    ///
    /// Nothing is written when the engine produced no samples.
    pub fn generate(
        &mut self,
        text: &str,
        speaker_id: u32,
        speed: f32,
        output: &Path,
    ) -> Result<Option<GenerationStats>, TtsError> {
        let Some((result, stats)) = self.synthesize(text, speaker_id, speed)? else {
            return Ok(None);
        };

        result.write_wav(output)?;
        log::info!("Audio saved to {}", output.display());

        Ok(Some(GenerationStats {
            output: Some(output.to_path_buf()),
            ..stats
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::VoiceConfigBuilder;
    use std::fs;
    use tempfile::tempdir;

    /// Engine returning a fixed buffer per call and recording every call.
    pub(crate) struct FakeEngine {
        pub sample_rate: u32,
        pub samples_per_call: Vec<f32>,
        pub calls: Vec<(String, u32, f32)>,
    }

    impl FakeEngine {
        pub(crate) fn new(sample_rate: u32, samples_per_call: Vec<f32>) -> Self {
            Self {
                sample_rate,
                samples_per_call,
                calls: Vec::new(),
            }
        }
    }

    impl SynthesisEngine for FakeEngine {
        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn synthesize(
            &mut self,
            text: &str,
            speaker_id: u32,
            speed: f32,
        ) -> Result<SynthesisResult, TtsError> {
            self.calls.push((text.to_string(), speaker_id, speed));
            Ok(SynthesisResult {
                samples: self.samples_per_call.clone(),
                sample_rate: self.sample_rate,
            })
        }
    }

    struct NeverLoaded;

    impl SynthesisEngine for NeverLoaded {
        fn sample_rate(&self) -> u32 {
            16000
        }

        fn synthesize(&mut self, _: &str, _: u32, _: f32) -> Result<SynthesisResult, TtsError> {
            unreachable!("engine must not be used")
        }
    }

    impl LoadableEngine for NeverLoaded {
        fn load(_: &VoiceConfig) -> Result<Self, TtsError> {
            panic!("load must not run for an invalid configuration")
        }
    }

    pub(crate) fn test_config() -> VoiceConfig {
        VoiceConfigBuilder::default()
            .model("model.onnx")
            .tokens("tokens.txt")
            .build()
            .unwrap()
    }

    #[test]
    fn generate_writes_engine_samples_at_engine_rate() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("output").join("hello.wav");
        let samples = vec![0.0, 0.25, -0.25, 0.5, -0.5];
        let mut tts = Tts::with_engine(test_config(), FakeEngine::new(22050, samples.clone()));

        let stats = tts.generate("Hello", 3, 1.25, &output).unwrap().unwrap();

        assert_eq!(stats.num_samples, samples.len());
        assert_eq!(stats.sample_rate, 22050);
        assert_eq!(stats.output.as_deref(), Some(output.as_path()));

        let mut reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.spec().bits_per_sample, 16);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        let expected: Vec<i16> = samples.iter().map(|&s| crate::wav::f32_to_i16(s)).collect();
        assert_eq!(decoded, expected);

        assert_eq!(tts.engine.calls, vec![("Hello".to_string(), 3, 1.25)]);
    }

    #[test]
    fn empty_result_writes_nothing_and_does_not_fail() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("output").join("silent.wav");
        let mut tts = Tts::with_engine(test_config(), FakeEngine::new(16000, Vec::new()));

        let stats = tts.generate("Hello", 1, 1.0, &output).unwrap();

        assert!(stats.is_none());
        assert!(!output.exists());
        assert!(!output.parent().unwrap().exists());
    }

    #[test]
    fn empty_result_leaves_existing_file_untouched() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("keep.wav");
        fs::write(&output, b"previous").unwrap();
        let mut tts = Tts::with_engine(test_config(), FakeEngine::new(16000, Vec::new()));

        tts.generate("Hello", 1, 1.0, &output).unwrap();

        assert_eq!(fs::read(&output).unwrap(), b"previous");
    }

    #[test]
    fn whole_request_reaches_the_engine_in_one_call() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("dr.wav");
        let mut config = test_config();
        config.max_num_sentences = 1;
        let mut tts = Tts::with_engine(config, FakeEngine::new(8000, vec![0.1; 3]));

        let stats = tts
            .generate("Dr. Smith is here. Hi!\nBye", 1, 1.0, &output)
            .unwrap()
            .unwrap();

        assert_eq!(
            tts.engine.calls,
            vec![("Dr. Smith is here. Hi!\nBye".to_string(), 1, 1.0)]
        );
        assert_eq!(stats.num_samples, 3);
        assert_eq!(hound::WavReader::open(&output).unwrap().len(), 3);
    }

    #[test]
    fn synthesize_reports_stats_without_output() {
        let mut tts = Tts::with_engine(test_config(), FakeEngine::new(8000, vec![0.1; 800]));
        let (result, stats) = tts.synthesize("Hi", 1, 1.0).unwrap().unwrap();
        assert_eq!(result.samples.len(), 800);
        assert_eq!(stats.num_samples, 800);
        assert_eq!(stats.audio_duration_secs(), 0.1);
        assert_eq!(stats.output, None);
    }

    #[test]
    fn sample_rate_is_cached_from_the_engine() {
        let tts = Tts::with_engine(test_config(), FakeEngine::new(24000, vec![0.0]));
        assert_eq!(tts.sample_rate(), 24000);
        assert_eq!(tts.num_speakers(), 1);
    }

    #[test]
    fn engine_changing_rate_is_rejected() {
        let mut tts = Tts::with_engine(test_config(), FakeEngine::new(24000, vec![0.0]));
        tts.engine.sample_rate = 16000;
        assert!(matches!(
            tts.synthesize("Hi", 1, 1.0),
            Err(TtsError::Metadata(_))
        ));
    }

    #[test]
    fn invalid_configuration_fails_before_loading() {
        let config = VoiceConfigBuilder::default()
            .model("/nonexistent/model.onnx")
            .tokens("/nonexistent/tokens.txt")
            .build()
            .unwrap();

        let err = Tts::<NeverLoaded>::new(config).err().unwrap();
        assert!(matches!(err, TtsError::Configuration(_)));
    }

    #[test]
    fn stats_report_real_time_factor() {
        let stats = GenerationStats {
            num_samples: 16000,
            sample_rate: 16000,
            elapsed: Duration::from_millis(250),
            output: None,
        };
        assert_eq!(stats.audio_duration_secs(), 1.0);
        assert!((stats.real_time_factor() - 0.25).abs() < 1e-9);
    }
}
