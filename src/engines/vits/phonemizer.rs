use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::tokens::TokenTable;
use crate::TtsError;

/// Sentence start, sentence end and pad symbols of espeak-based voices.
const BOS: &str = "^";
const EOS: &str = "$";
const PAD: &str = "_";

/// How to invoke espeak-ng for a voice.
#[derive(Debug, Clone)]
pub struct EspeakConfig {
    /// espeak-ng voice, e.g. `"en-us"`. Comes from the model metadata.
    pub voice: String,
    /// The `espeak-ng-data` directory configured for the voice.
    pub data_dir: PathBuf,
}

impl EspeakConfig {
    /// espeak-ng's `--path` wants the directory that contains `espeak-ng-data`.
    fn search_path(&self) -> &Path {
        self.data_dir.parent().unwrap_or(Path::new("."))
    }
}

/// Phonemize `text` with espeak-ng and map the IPA to framed token ids.
pub fn phonemize(
    text: &str,
    espeak: &EspeakConfig,
    tokens: &TokenTable,
) -> Result<Vec<i64>, TtsError> {
    let ipa = run_espeak(text, espeak)?;
    Ok(ipa_to_ids(&ipa, tokens))
}

fn run_espeak(input: &str, espeak: &EspeakConfig) -> Result<String, TtsError> {
    let path_arg = format!("--path={}", espeak.search_path().display());
    let mut child = Command::new("espeak-ng")
        .args(["--ipa", "--stdin", "-q", "-v", espeak.voice.as_str()])
        .arg(path_arg)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TtsError::EspeakNotFound
            } else {
                TtsError::Io(e)
            }
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        // espeak-ng reads stdin line by line; an unterminated last line loses its final token.
        let stdin_payload = canonicalize_espeak_stdin_payload(input);
        stdin.write_all(stdin_payload.as_bytes())?;
    }

    let output = child.wait_with_output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TtsError::PhonemizerFailed(format!(
            "espeak-ng exited with code {:?}: {stderr}",
            output.status.code()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn canonicalize_espeak_stdin_payload(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

/// Map espeak IPA output to ids framed as `^ _ p1 _ p2 _ ... $`.
///
/// Each output line is one clause; its phonemes are joined by a space token
/// when the voice has one. Symbols missing from the table are dropped.
fn ipa_to_ids(ipa: &str, tokens: &TokenTable) -> Vec<i64> {
    let pad = tokens.get(PAD);
    let space = tokens.get(" ");
    let mut phonemes = Vec::new();

    for line in ipa.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !phonemes.is_empty() {
            phonemes.extend(space);
        }
        for ch in line.chars() {
            if ch == '_' {
                continue;
            }
            if ch.is_whitespace() {
                phonemes.extend(space);
                continue;
            }
            if let Some(id) = tokens.get_char(ch) {
                phonemes.push(id);
            }
        }
    }

    if phonemes.is_empty() {
        return phonemes;
    }

    let mut ids = Vec::with_capacity(phonemes.len() * 2 + 3);
    ids.extend(tokens.get(BOS));
    ids.extend(pad);
    for id in phonemes {
        ids.push(id);
        ids.extend(pad);
    }
    ids.extend(tokens.get(EOS));
    ids
}
