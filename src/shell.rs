//! Interactive prompt loop.
//!
//! The loop is split in two: [`ShellMachine`] is a pure state machine fed one
//! input line at a time, and [`run`] drives it over any `BufRead`/`Write` pair.
//!
//! ```text
//! SpeakerId -> Speed -> Text -> Filename -> Synthesize -> Continue
//!     ^                  |  ^                              |
//!     |                  +--+ (blank text)                 |
//!     +----------------------- "y" ------------------------+--> Terminated
//! ```

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::{GenerationStats, SynthesisEngine, Tts, TtsError};

pub const DEFAULT_SPEAKER_ID: u32 = 1;
pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_FILENAME: &str = "generated.wav";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// One fully collected request, ready for synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub speaker_id: u32,
    pub speed: f32,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    SpeakerId,
    Speed,
    Text,
    Filename,
    Continue,
}

impl Prompt {
    pub fn message(&self) -> &'static str {
        match self {
            Prompt::SpeakerId => "Speaker ID (default: 1): ",
            Prompt::Speed => "Speed (default: 1.0): ",
            Prompt::Text => "Text to synthesize: ",
            Prompt::Filename => "Output file name (default: generated.wav): ",
            Prompt::Continue => "Generate another? (y/n): ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellState {
    Prompt(Prompt),
    Synthesize(SynthesisRequest),
    Terminated,
}

/// Recoverable input problems reported back to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    InvalidSpeakerId(String),
    InvalidSpeed(String),
    BlankText,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::InvalidSpeakerId(input) => write!(
                f,
                "Invalid speaker ID {input:?}, using default {DEFAULT_SPEAKER_ID}"
            ),
            Notice::InvalidSpeed(input) => {
                write!(f, "Invalid speed {input:?}, using default {DEFAULT_SPEED:.1}")
            }
            Notice::BlankText => f.write_str("Text cannot be empty, please try again."),
        }
    }
}

/// Parse a speaker id. Blank input is the default without a notice.
pub fn parse_speaker_id(input: &str) -> (u32, Option<Notice>) {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return (DEFAULT_SPEAKER_ID, None);
    }
    match trimmed.parse::<u32>() {
        Ok(id) => (id, None),
        Err(_) => (
            DEFAULT_SPEAKER_ID,
            Some(Notice::InvalidSpeakerId(trimmed.to_string())),
        ),
    }
}

/// Parse a speed factor. Anything that is not a positive finite number falls back to 1.0.
pub fn parse_speed(input: &str) -> (f32, Option<Notice>) {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return (DEFAULT_SPEED, None);
    }
    match trimmed.parse::<f32>() {
        Ok(speed) if speed.is_finite() && speed > 0.0 => (speed, None),
        _ => (
            DEFAULT_SPEED,
            Some(Notice::InvalidSpeed(trimmed.to_string())),
        ),
    }
}

/// Resolve a user-supplied file name to a `.wav` path under `output_dir`.
pub fn output_path(output_dir: &Path, input: &str) -> PathBuf {
    let name = input.trim();
    let name = if name.is_empty() { DEFAULT_FILENAME } else { name };
    if name.ends_with(".wav") {
        output_dir.join(name)
    } else {
        output_dir.join(format!("{name}.wav"))
    }
}

/// The prompt sequence as a state machine, independent of any I/O.
#[derive(Debug)]
pub struct ShellMachine {
    output_dir: PathBuf,
    state: ShellState,
    speaker_id: u32,
    speed: f32,
    text: String,
}

impl ShellMachine {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            state: ShellState::Prompt(Prompt::SpeakerId),
            speaker_id: DEFAULT_SPEAKER_ID,
            speed: DEFAULT_SPEED,
            text: String::new(),
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ShellState::Terminated
    }

    /// Feed the answer to the current prompt.
    ///
    /// Input outside a prompt state is ignored.
    pub fn feed(&mut self, line: &str) -> Option<Notice> {
        let ShellState::Prompt(prompt) = self.state else {
            log::warn!("Ignoring input while in state {:?}", self.state);
            return None;
        };

        match prompt {
            Prompt::SpeakerId => {
                let (id, notice) = parse_speaker_id(line);
                self.speaker_id = id;
                self.state = ShellState::Prompt(Prompt::Speed);
                notice
            }
            Prompt::Speed => {
                let (speed, notice) = parse_speed(line);
                self.speed = speed;
                self.state = ShellState::Prompt(Prompt::Text);
                notice
            }
            Prompt::Text => {
                if line.trim().is_empty() {
                    return Some(Notice::BlankText);
                }
                self.text = line.to_string();
                self.state = ShellState::Prompt(Prompt::Filename);
                None
            }
            Prompt::Filename => {
                self.state = ShellState::Synthesize(SynthesisRequest {
                    text: std::mem::take(&mut self.text),
                    speaker_id: self.speaker_id,
                    speed: self.speed,
                    output: output_path(&self.output_dir, line),
                });
                None
            }
            Prompt::Continue => {
                self.state = if line.trim().eq_ignore_ascii_case("y") {
                    self.speaker_id = DEFAULT_SPEAKER_ID;
                    self.speed = DEFAULT_SPEED;
                    ShellState::Prompt(Prompt::SpeakerId)
                } else {
                    ShellState::Terminated
                };
                None
            }
        }
    }

    /// Mark the pending request as handled and move to the continue prompt.
    pub fn synthesized(&mut self) {
        if matches!(self.state, ShellState::Synthesize(_)) {
            self.state = ShellState::Prompt(Prompt::Continue);
        }
    }

    /// Standard input closed.
    pub fn end_of_input(&mut self) {
        self.state = ShellState::Terminated;
    }
}

/// Drive the prompt loop until the user stops or input ends.
///
/// `synthesize` is called once per collected request and a one-line summary of
/// its outcome is printed. Its errors are fatal and end the loop. Returns the
/// number of requests handled.
pub fn run<R, W, F>(
    input: R,
    mut output: W,
    output_dir: &Path,
    mut synthesize: F,
) -> Result<usize, TtsError>
where
    R: BufRead,
    W: Write,
    F: FnMut(&SynthesisRequest) -> Result<Option<GenerationStats>, TtsError>,
{
    let mut machine = ShellMachine::new(output_dir);
    let mut lines = input.lines();
    let mut handled = 0;

    loop {
        match machine.state().clone() {
            ShellState::Terminated => break,
            ShellState::Synthesize(request) => {
                let stats = synthesize(&request)?;
                writeln!(output, "{}", summary(&request, stats.as_ref()))?;
                handled += 1;
                machine.synthesized();
            }
            ShellState::Prompt(prompt) => {
                if prompt == Prompt::SpeakerId {
                    writeln!(output, "\nPlease enter each field:")?;
                }
                write!(output, "{}", prompt.message())?;
                output.flush()?;

                let Some(line) = lines.next().transpose()? else {
                    writeln!(output)?;
                    machine.end_of_input();
                    continue;
                };

                if let Some(notice) = machine.feed(&line) {
                    log::debug!("{notice}");
                    writeln!(output, "{notice}")?;
                }
            }
        }
    }

    Ok(handled)
}

/// Run the prompt loop against a loaded voice, writing each result under `output_dir`.
pub fn run_interactive<E, R, W>(
    tts: &mut Tts<E>,
    input: R,
    output: W,
    output_dir: &Path,
) -> Result<usize, TtsError>
where
    E: SynthesisEngine,
    R: BufRead,
    W: Write,
{
    run(input, output, output_dir, |request| {
        tts.generate(
            &request.text,
            request.speaker_id,
            request.speed,
            &request.output,
        )
    })
}

fn summary(request: &SynthesisRequest, stats: Option<&GenerationStats>) -> String {
    match stats {
        Some(stats) => format!(
            "Saved {} ({:.2}s of audio, real-time factor {:.2})",
            stats.output.as_deref().unwrap_or(&request.output).display(),
            stats.audio_duration_secs(),
            stats.real_time_factor()
        ),
        None => "No audio generated, nothing saved.".to_string(),
    }
}
