use std::io;
use std::path::PathBuf;

use clap::Parser;

use offline_tts::{
    config::{Provider, VoiceConfig, VoiceConfigBuilder},
    engines::vits::VitsEngine,
    shell::{self, DEFAULT_OUTPUT_DIR},
    Tts, TtsError,
};

#[derive(Debug, Parser)]
#[command(name = "offline-tts")]
#[command(about = "Interactive text-to-speech with an offline VITS voice")]
struct Cli {
    /// JSON voice configuration. Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    model: Option<PathBuf>,
    #[arg(long)]
    tokens: Option<PathBuf>,
    #[arg(long)]
    lexicon: Option<PathBuf>,
    /// espeak-ng data directory for phonemizer-based voices
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    dict_dir: Option<PathBuf>,
    #[arg(long, value_enum)]
    provider: Option<Provider>,
    #[arg(long)]
    num_threads: Option<usize>,
    #[arg(long)]
    max_num_sentences: Option<usize>,
    #[arg(long)]
    debug: bool,
    /// Directory the generated WAV files are written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

impl Cli {
    fn voice_config(&self) -> Result<VoiceConfig, TtsError> {
        let mut config = match &self.config {
            Some(path) => VoiceConfig::from_json_file(path)?,
            None => {
                let mut builder = VoiceConfigBuilder::default();
                builder.model("./model.onnx").tokens("./tokens.txt");
                // espeak-ng voices carry no lexicon
                if self.data_dir.is_none() {
                    builder.lexicon("./lexicon.txt").dict_dir("./dict");
                }
                builder.build()?
            }
        };

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(tokens) = &self.tokens {
            config.tokens = tokens.clone();
        }
        if let Some(lexicon) = &self.lexicon {
            config.lexicon = Some(lexicon.clone());
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = Some(data_dir.clone());
        }
        if let Some(dict_dir) = &self.dict_dir {
            config.dict_dir = Some(dict_dir.clone());
        }
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(num_threads) = self.num_threads {
            config.num_threads = num_threads;
        }
        if let Some(max_num_sentences) = self.max_num_sentences {
            config.max_num_sentences = max_num_sentences;
        }
        config.debug |= self.debug;

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = cli.voice_config()?;
    log::debug!("Voice configuration: {config:?}");

    let mut tts = Tts::<VitsEngine>::new(config)?;

    let stdin = io::stdin();
    let handled = shell::run_interactive(&mut tts, stdin.lock(), io::stdout(), &cli.output_dir)?;
    log::info!("Handled {handled} request(s), exiting");

    Ok(())
}
