use std::collections::HashMap;

use crate::TtsError;

/// Custom metadata keys read from a VITS model.
pub const METADATA_KEYS: &[&str] = &[
    "sample_rate",
    "add_blank",
    "n_speakers",
    "voice",
    "language",
    "model_type",
    "comment",
];

/// Voice properties stored in the ONNX model's custom metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct VitsMetadata {
    pub sample_rate: u32,
    /// Interleave blank id 0 between lexicon tokens.
    pub add_blank: bool,
    pub num_speakers: usize,
    /// espeak-ng voice for phonemizer-based models.
    pub voice: Option<String>,
    pub language: Option<String>,
    pub model_type: Option<String>,
    pub comment: Option<String>,
}

impl VitsMetadata {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, TtsError> {
        let sample_rate = map
            .get("sample_rate")
            .ok_or_else(|| TtsError::Metadata("missing `sample_rate`".to_string()))?;
        let sample_rate: u32 = sample_rate.trim().parse().map_err(|_| {
            TtsError::Metadata(format!("`sample_rate` is not an integer: {sample_rate:?}"))
        })?;
        if sample_rate == 0 {
            return Err(TtsError::Metadata("`sample_rate` must be positive".to_string()));
        }

        let add_blank = match map.get("add_blank").map(|v| v.trim()) {
            None | Some("") | Some("0") => false,
            Some("1") => true,
            Some(other) => {
                return Err(TtsError::Metadata(format!(
                    "`add_blank` must be 0 or 1, got {other:?}"
                )))
            }
        };

        let num_speakers = match map.get("n_speakers") {
            None => 1,
            Some(value) => value.trim().parse::<usize>().map_err(|_| {
                TtsError::Metadata(format!("`n_speakers` is not an integer: {value:?}"))
            })?,
        }
        .max(1);

        let text = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            sample_rate,
            add_blank,
            num_speakers,
            voice: text("voice"),
            language: text("language"),
            model_type: text("model_type"),
            comment: text("comment"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::VitsMetadata;
    use crate::TtsError;
    use std::collections::HashMap;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_multi_speaker_lexicon_voice() {
        let meta = VitsMetadata::from_map(&map(&[
            ("sample_rate", "8000"),
            ("add_blank", "1"),
            ("n_speakers", "174"),
            ("language", "Chinese"),
        ]))
        .unwrap();

        assert_eq!(meta.sample_rate, 8000);
        assert!(meta.add_blank);
        assert_eq!(meta.num_speakers, 174);
        assert_eq!(meta.language.as_deref(), Some("Chinese"));
        assert_eq!(meta.voice, None);
    }

    #[test]
    fn defaults_to_single_speaker_without_blanks() {
        let meta = VitsMetadata::from_map(&map(&[
            ("sample_rate", "22050"),
            ("n_speakers", "0"),
            ("voice", "en-us"),
        ]))
        .unwrap();

        assert!(!meta.add_blank);
        assert_eq!(meta.num_speakers, 1);
        assert_eq!(meta.voice.as_deref(), Some("en-us"));
    }

    #[test]
    fn sample_rate_is_required() {
        let err = VitsMetadata::from_map(&map(&[("add_blank", "1")])).unwrap_err();
        assert!(matches!(err, TtsError::Metadata(msg) if msg.contains("sample_rate")));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(VitsMetadata::from_map(&map(&[("sample_rate", "fast")])).is_err());
        assert!(
            VitsMetadata::from_map(&map(&[("sample_rate", "16000"), ("add_blank", "yes")]))
                .is_err()
        );
    }
}
