use std::path::Path;

use crate::TtsError;

/// Convert a float sample in [-1, 1] to 16-bit PCM. Out-of-range input is clipped.
pub fn f32_to_i16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Write mono samples as a 16-bit PCM WAV file.
///
/// The parent directory is created if it does not exist. A failed write may
/// leave a partial file behind.
pub fn write_pcm16(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), TtsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(f32_to_i16(sample))?;
    }
    writer.finalize()?;

    log::debug!(
        "Wrote {} samples at {}Hz to {}",
        samples.len(),
        sample_rate,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn quantizes_and_clips() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(-1.0), -i16::MAX);
        assert_eq!(f32_to_i16(2.5), i16::MAX);
        assert_eq!(f32_to_i16(-3.0), -i16::MAX);
        assert_eq!(f32_to_i16(f32::NAN), 0);
    }

    #[test]
    fn written_file_decodes_to_same_rate_and_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<f32> = (0..1600)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();

        write_pcm16(&path, &samples, 16000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), samples.len());
        for (&original, &pcm) in samples.iter().zip(&decoded) {
            assert_eq!(pcm, f32_to_i16(original));
            let back = pcm as f32 / i16::MAX as f32;
            assert!((back - original).abs() <= 1.0 / i16::MAX as f32);
        }
    }

    #[test]
    fn creates_missing_directories_idempotently() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output").join("nested").join("a.wav");

        write_pcm16(&path, &[0.1, -0.1], 22050).unwrap();
        write_pcm16(&path, &[0.2], 22050).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn unwritable_target_is_an_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = write_pcm16(&blocker.join("a.wav"), &[0.0], 16000).unwrap_err();
        assert!(matches!(err, TtsError::Io(_)));
    }
}
