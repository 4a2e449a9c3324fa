use std::collections::HashMap;
use std::path::Path;

use super::tokens::TokenTable;
use crate::TtsError;

/// Pronunciations loaded from `lexicon.txt`.
///
/// Each line is a word followed by the model tokens it expands to. Words are
/// stored lowercase; the first definition of a word wins.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashMap<String, Vec<i64>>,
    /// Longest entry in chars, bounds the greedy match over CJK runs.
    max_word_chars: usize,
}

impl Lexicon {
    pub fn load(path: &Path, tokens: &TokenTable) -> Result<Self, TtsError> {
        let content = std::fs::read_to_string(path)?;
        let lexicon = Self::parse(&content, tokens)?;
        log::info!("Loaded {} lexicon entries from {}", lexicon.len(), path.display());
        Ok(lexicon)
    }

    pub fn parse(content: &str, tokens: &TokenTable) -> Result<Self, TtsError> {
        let mut words = HashMap::new();
        let mut max_word_chars = 0;
        let mut skipped = 0usize;

        for (lineno, line) in content.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let word = word.to_lowercase();

            let ids: Option<Vec<i64>> = fields.map(|symbol| tokens.get(symbol)).collect();
            let ids = match ids {
                Some(ids) if !ids.is_empty() => ids,
                Some(_) => {
                    log::debug!("Lexicon line {}: {word:?} has no tokens", lineno + 1);
                    skipped += 1;
                    continue;
                }
                None => {
                    log::debug!(
                        "Lexicon line {}: {word:?} uses a token missing from tokens.txt",
                        lineno + 1
                    );
                    skipped += 1;
                    continue;
                }
            };

            max_word_chars = max_word_chars.max(word.chars().count());
            words.entry(word).or_insert(ids);
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} unusable lexicon entries");
        }
        if words.is_empty() {
            return Err(TtsError::Lexicon("no usable entries".to_string()));
        }

        Ok(Self {
            words,
            max_word_chars,
        })
    }

    pub fn get(&self, word: &str) -> Option<&[i64]> {
        self.words.get(word).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF)
}

fn is_punctuation(ch: char) -> bool {
    (ch.is_ascii_punctuation() && ch != '\'')
        || matches!(
            ch,
            '，' | '。' | '！' | '？' | '；' | '：' | '、' | '“' | '”' | '‘' | '’' | '（' | '）'
                | '《' | '》' | '—' | '…'
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Word(String),
    Cjk(String),
    Punct(char),
    Space,
}

fn segment(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_is_cjk = false;

    let flush = |segments: &mut Vec<Segment>, current: &mut String, cjk: bool| {
        if current.is_empty() {
            return;
        }
        let part = std::mem::take(current);
        segments.push(if cjk {
            Segment::Cjk(part)
        } else {
            Segment::Word(part)
        });
    };

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            flush(&mut segments, &mut current, current_is_cjk);
            if !matches!(segments.last(), Some(Segment::Space) | None) {
                segments.push(Segment::Space);
            }
        } else if is_punctuation(ch) {
            flush(&mut segments, &mut current, current_is_cjk);
            segments.push(Segment::Punct(ch));
        } else {
            let cjk = is_cjk(ch);
            if cjk != current_is_cjk {
                flush(&mut segments, &mut current, current_is_cjk);
                current_is_cjk = cjk;
            }
            current.push(ch);
        }
    }
    flush(&mut segments, &mut current, current_is_cjk);

    if segments.last() == Some(&Segment::Space) {
        segments.pop();
    }
    segments
}

/// Convert text to token ids using a lexicon and the token table.
///
/// Latin words are looked up whole; CJK runs are matched greedily against the
/// lexicon, longest entry first. Anything the lexicon lacks falls back to a
/// per-character token lookup, and characters unknown to both are dropped.
/// Punctuation maps to its own token, or to `sp`/`sil` when the voice has one.
pub fn text_to_ids(text: &str, lexicon: Option<&Lexicon>, tokens: &TokenTable) -> Vec<i64> {
    let mut ids = Vec::new();
    let pause = tokens.get("sp").or_else(|| tokens.get("sil"));

    for segment in segment(text) {
        match segment {
            Segment::Word(word) => {
                if let Some(found) = lexicon.and_then(|l| l.get(&word)) {
                    ids.extend_from_slice(found);
                } else {
                    push_chars(&mut ids, &word, lexicon, tokens);
                }
            }
            Segment::Cjk(run) => match lexicon {
                Some(lexicon) => push_cjk_run(&mut ids, &run, lexicon, tokens),
                None => push_chars(&mut ids, &run, None, tokens),
            },
            Segment::Punct(ch) => {
                if let Some(id) = tokens.get_char(ch).or(pause) {
                    ids.push(id);
                }
            }
            Segment::Space => {
                if let Some(id) = tokens.get(" ") {
                    ids.push(id);
                }
            }
        }
    }

    ids
}

fn push_chars(ids: &mut Vec<i64>, text: &str, lexicon: Option<&Lexicon>, tokens: &TokenTable) {
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let symbol = ch.encode_utf8(&mut buf);
        if let Some(found) = lexicon.and_then(|l| l.get(symbol)) {
            ids.extend_from_slice(found);
        } else if let Some(id) = tokens.get(symbol) {
            ids.push(id);
        } else {
            log::debug!("No pronunciation for {ch:?}, dropping it");
        }
    }
}

fn push_cjk_run(ids: &mut Vec<i64>, run: &str, lexicon: &Lexicon, tokens: &TokenTable) {
    let chars: Vec<char> = run.chars().collect();
    let mut start = 0;

    while start < chars.len() {
        let longest = lexicon.max_word_chars.min(chars.len() - start);
        let matched = (1..=longest).rev().find_map(|len| {
            let word: String = chars[start..start + len].iter().collect();
            lexicon.get(&word).map(|found| (len, found))
        });

        match matched {
            Some((len, found)) => {
                ids.extend_from_slice(found);
                start += len;
            }
            None => {
                let single: String = chars[start..=start].iter().collect();
                push_chars(ids, &single, None, tokens);
                start += 1;
            }
        }
    }
}

/// Insert `blank` between every token and at both ends.
pub fn intersperse_blank(ids: &[i64], blank: i64) -> Vec<i64> {
    let mut out = Vec::with_capacity(ids.len() * 2 + 1);
    out.push(blank);
    for &id in ids {
        out.push(id);
        out.push(blank);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> TokenTable {
        TokenTable::parse(
            "_ 0\n 1\nsil 2\nn 3\ni3 4\nh 5\nao3 6\nt 7\nian1 8\nq 9\ni4 10\nə 12\nl 13\now 14\n, 15\na 16\nb 17\n",
        )
        .unwrap()
    }

    fn lexicon(tokens: &TokenTable) -> Lexicon {
        Lexicon::parse(
            "你 n i3\n好 h ao3\n你好 n i3 h ao3\n天气 t ian1 q i4\nHello h ə l ow\nbad zz\n",
            tokens,
        )
        .unwrap()
    }

    #[test]
    fn parse_lowercases_and_skips_unknown_tokens() {
        let tokens = tokens();
        let lexicon = lexicon(&tokens);
        assert_eq!(lexicon.get("hello"), Some(&[5, 12, 13, 14][..]));
        assert_eq!(lexicon.get("bad"), None);
        assert_eq!(lexicon.len(), 5);
        assert_eq!(lexicon.max_word_chars, 5);
    }

    #[test]
    fn cjk_runs_use_longest_match() {
        let tokens = tokens();
        let lexicon = lexicon(&tokens);
        assert_eq!(
            text_to_ids("你好天气", Some(&lexicon), &tokens),
            vec![3, 4, 5, 6, 7, 8, 9, 10]
        );
    }

    #[test]
    fn punctuation_falls_back_to_pause_token() {
        let tokens = tokens();
        let lexicon = lexicon(&tokens);
        assert_eq!(
            text_to_ids("你好。好", Some(&lexicon), &tokens),
            vec![3, 4, 5, 6, 2, 5, 6]
        );
        assert_eq!(text_to_ids("好,好", Some(&lexicon), &tokens), vec![5, 6, 15, 5, 6]);
    }

    #[test]
    fn latin_words_and_spaces() {
        let tokens = tokens();
        let lexicon = lexicon(&tokens);
        assert_eq!(
            text_to_ids("HELLO  ab ", Some(&lexicon), &tokens),
            vec![5, 12, 13, 14, 1, 16, 17]
        );
    }

    #[test]
    fn without_lexicon_characters_map_directly() {
        let tokens = tokens();
        assert_eq!(text_to_ids("ab ba", None, &tokens), vec![16, 17, 1, 17, 16]);
    }

    #[test]
    fn unknown_characters_are_dropped() {
        let tokens = tokens();
        let lexicon = lexicon(&tokens);
        assert_eq!(text_to_ids("猫", Some(&lexicon), &tokens), Vec::<i64>::new());
    }

    #[test]
    fn blanks_surround_every_token() {
        assert_eq!(intersperse_blank(&[5, 6], 0), vec![0, 5, 0, 6, 0]);
        assert_eq!(intersperse_blank(&[], 0), vec![0]);
    }
}
