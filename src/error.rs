#[derive(thiserror::Error, Debug)]
pub enum TtsError {
    #[error("Invalid voice configuration: {0}")]
    Configuration(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),
    #[cfg(feature = "vits")]
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[cfg(feature = "vits")]
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("Invalid tokens file: {0}")]
    Tokens(String),
    #[error("Invalid lexicon file: {0}")]
    Lexicon(String),
    #[error("Invalid model metadata: {0}")]
    Metadata(String),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("Phonemization failed: {0}")]
    PhonemizerFailed(String),
}
