use crate::{LoadableEngine, SynthesisEngine, SynthesisResult, TtsError, VoiceConfig};

use super::lexicon::{intersperse_blank, text_to_ids, Lexicon};
use super::model::VitsModel;
use super::params::{resolve_speaker, SynthesisParams};
use super::phonemizer::{phonemize, EspeakConfig};
use super::tokens::TokenTable;

/// How text becomes token ids for the loaded voice.
enum Frontend {
    /// Word and character lookups; the lexicon is optional for character-based voices.
    Lexicon(Option<Lexicon>),
    Espeak(EspeakConfig),
}

/// VITS text-to-speech engine.
///
/// Runs a VITS ONNX model through ONNX Runtime. Text is converted to token ids
/// either through a lexicon (most Chinese voices) or through espeak-ng when a
/// `data_dir` is configured.
///
/// ```rust,no_run
/// use offline_tts::{config::VoiceConfigBuilder, engines::vits::VitsEngine, Tts};
///
/// let config = VoiceConfigBuilder::default()
///     .model("vits-zh-aishell3/model.onnx")
///     .tokens("vits-zh-aishell3/tokens.txt")
///     .lexicon("vits-zh-aishell3/lexicon.txt")
///     .build()?;
/// let mut tts = Tts::<VitsEngine>::new(config)?;
/// let audio = tts.synthesize("你好，世界", 10, 1.0)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct VitsEngine {
    model: VitsModel,
    tokens: TokenTable,
    frontend: Frontend,
    params: SynthesisParams,
    debug: bool,
}

impl VitsEngine {
    fn ids_for(&self, text: &str) -> Result<Vec<i64>, TtsError> {
        match &self.frontend {
            Frontend::Espeak(espeak) => phonemize(text, espeak, &self.tokens),
            Frontend::Lexicon(lexicon) => {
                let ids = text_to_ids(text, lexicon.as_ref(), &self.tokens);
                if self.model.metadata().add_blank && !ids.is_empty() {
                    Ok(intersperse_blank(&ids, 0))
                } else {
                    Ok(ids)
                }
            }
        }
    }
}

impl LoadableEngine for VitsEngine {
    fn load(config: &VoiceConfig) -> Result<Self, TtsError> {
        let model = VitsModel::load(&config.model, config.provider, config.num_threads)?;
        let tokens = TokenTable::load(&config.tokens)?;

        if config.debug {
            log::info!("Model metadata: {:?}", model.metadata());
        }

        let frontend = match &config.data_dir {
            Some(data_dir) => {
                let voice = model.metadata().voice.clone().ok_or_else(|| {
                    TtsError::Configuration(
                        "data_dir is set but the model has no `voice` metadata for espeak-ng"
                            .to_string(),
                    )
                })?;
                log::info!("Using espeak-ng front end (voice {voice})");
                Frontend::Espeak(EspeakConfig {
                    voice,
                    data_dir: data_dir.clone(),
                })
            }
            None => {
                let lexicon = config
                    .lexicon
                    .as_deref()
                    .map(|path| Lexicon::load(path, &tokens))
                    .transpose()?;
                if lexicon.is_none() {
                    log::warn!("No lexicon configured, mapping characters straight to tokens");
                }
                Frontend::Lexicon(lexicon)
            }
        };

        // Segmentation is a greedy lexicon match; the jieba dictionaries are not read.
        if let Some(dict_dir) = &config.dict_dir {
            log::debug!("dict_dir {} accepted but unused", dict_dir.display());
        }

        Ok(Self {
            model,
            tokens,
            frontend,
            params: SynthesisParams::from_config(config),
            debug: config.debug,
        })
    }
}

impl SynthesisEngine for VitsEngine {
    fn sample_rate(&self) -> u32 {
        self.model.metadata().sample_rate
    }

    fn num_speakers(&self) -> usize {
        self.model.metadata().num_speakers
    }

    /// Synthesize `text`, one model run per batch of at most
    /// `max_num_sentences` sentences, concatenating the audio.
    fn synthesize(
        &mut self,
        text: &str,
        speaker_id: u32,
        speed: f32,
    ) -> Result<SynthesisResult, TtsError> {
        let sample_rate = self.sample_rate();
        let speaker_id = resolve_speaker(speaker_id, self.num_speakers());
        let scales = self.params.scales_for(speed);

        let mut samples = Vec::new();
        for batch in self.params.batches(text) {
            let ids = self.ids_for(&batch)?;
            if ids.is_empty() {
                log::warn!("No tokens produced for text: {batch:?}");
                continue;
            }
            if self.debug {
                log::debug!("Token ids ({}): {ids:?}", ids.len());
            }
            let audio = self.model.run(&ids, speaker_id as i64, scales)?;
            samples.extend_from_slice(&audio);
        }

        Ok(SynthesisResult {
            samples,
            sample_rate,
        })
    }
}
