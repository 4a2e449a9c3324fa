use crate::text::batch_sentences;
use crate::VoiceConfig;

/// Per-call sampling parameters fed to the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub noise_scale: f32,
    pub length_scale: f32,
    pub noise_scale_w: f32,
}

/// Request-independent synthesis settings taken from the voice configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisParams {
    pub noise_scale: f32,
    pub noise_scale_w: f32,
    /// Length scale at speed 1.0.
    pub length_scale: f32,
    pub max_num_sentences: usize,
}

impl SynthesisParams {
    pub fn from_config(config: &VoiceConfig) -> Self {
        Self {
            noise_scale: config.noise_scale,
            noise_scale_w: config.noise_scale_w,
            length_scale: config.length_scale,
            max_num_sentences: config.max_num_sentences,
        }
    }

    /// Scales for one request. Speed divides the length scale; a speed that is
    /// not a positive finite number counts as 1.0.
    pub fn scales_for(&self, speed: f32) -> Scales {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            log::warn!("Speed {speed} is not positive, using 1.0");
            1.0
        };

        Scales {
            noise_scale: self.noise_scale,
            length_scale: self.length_scale / speed,
            noise_scale_w: self.noise_scale_w,
        }
    }

    /// Split text into the pieces handed to the model, at most
    /// `max_num_sentences` sentences each.
    pub fn batches(&self, text: &str) -> Vec<String> {
        let mut batches = batch_sentences(text, self.max_num_sentences);
        if batches.is_empty() && !text.trim().is_empty() {
            batches.push(text.trim().to_string());
        }
        batches
    }
}

/// Map a requested speaker id onto the voice; out-of-range ids become 0.
pub fn resolve_speaker(speaker_id: u32, num_speakers: usize) -> u32 {
    if (speaker_id as usize) < num_speakers {
        speaker_id
    } else {
        log::warn!("Speaker id {speaker_id} out of range for {num_speakers} speaker(s), using 0");
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_num_sentences: usize) -> SynthesisParams {
        SynthesisParams {
            noise_scale: 0.667,
            noise_scale_w: 0.8,
            length_scale: 1.0,
            max_num_sentences,
        }
    }

    #[test]
    fn speaker_in_range_is_kept() {
        assert_eq!(resolve_speaker(10, 174), 10);
        assert_eq!(resolve_speaker(0, 1), 0);
    }

    #[test]
    fn speaker_out_of_range_falls_back_to_zero() {
        assert_eq!(resolve_speaker(174, 174), 0);
        assert_eq!(resolve_speaker(u32::MAX, 3), 0);
    }

    #[test]
    fn default_speaker_on_single_speaker_voice_is_zero() {
        assert_eq!(resolve_speaker(1, 1), 0);
    }

    #[test]
    fn speed_divides_length_scale() {
        let scales = params(1).scales_for(2.0);
        assert_eq!(scales.length_scale, 0.5);
        assert_eq!(scales.noise_scale, 0.667);
        assert_eq!(scales.noise_scale_w, 0.8);

        let slow = SynthesisParams {
            length_scale: 1.2,
            ..params(1)
        };
        assert!((slow.scales_for(0.5).length_scale - 2.4).abs() < 1e-6);
    }

    #[test]
    fn non_positive_speed_counts_as_natural_rate() {
        for speed in [0.0, -1.5, f32::NAN, f32::INFINITY] {
            assert_eq!(params(1).scales_for(speed).length_scale, 1.0, "speed {speed}");
        }
    }

    #[test]
    fn text_is_batched_by_sentence_count() {
        assert_eq!(
            params(2).batches("One. Two. Three."),
            vec!["One. Two.", "Three."]
        );
        assert_eq!(params(1).batches("One. Two. Three.").len(), 3);
    }

    #[test]
    fn punctuation_only_text_is_one_batch() {
        assert_eq!(params(1).batches("..."), vec!["..."]);
        assert!(params(1).batches("   ").is_empty());
    }

    #[test]
    fn from_config_copies_voice_settings() {
        let mut config = crate::tts::tests::test_config();
        config.max_num_sentences = 4;
        config.length_scale = 1.1;
        let params = SynthesisParams::from_config(&config);
        assert_eq!(params.max_num_sentences, 4);
        assert_eq!(params.length_scale, 1.1);
    }
}
