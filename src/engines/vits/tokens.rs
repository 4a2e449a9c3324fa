use std::collections::HashMap;
use std::path::Path;

use crate::TtsError;

/// Mapping from model symbols to token ids, loaded from `tokens.txt`.
///
/// Each line holds a symbol and its integer id separated by whitespace. A line
/// whose symbol part is empty (`" 3"`) defines the space symbol.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    ids: HashMap<String, i64>,
}

impl TokenTable {
    pub fn load(path: &Path) -> Result<Self, TtsError> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse(&content)?;
        log::info!("Loaded {} tokens from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn parse(content: &str) -> Result<Self, TtsError> {
        let mut ids = HashMap::new();

        for (lineno, raw) in content.lines().enumerate() {
            // A leading space is the space symbol; trailing whitespace is noise.
            let line = raw.trim_end();
            if line.trim_start().is_empty() {
                continue;
            }

            let (symbol, id) = match line.rsplit_once(|c: char| c == ' ' || c == '\t') {
                Some((symbol, id)) if symbol.is_empty() => (" ", id),
                Some((symbol, id)) => (symbol, id),
                None => {
                    return Err(TtsError::Tokens(format!(
                        "line {}: expected `symbol id`, got {line:?}",
                        lineno + 1
                    )))
                }
            };

            let id: i64 = id.trim().parse().map_err(|_| {
                TtsError::Tokens(format!(
                    "line {}: token id {id:?} is not an integer",
                    lineno + 1
                ))
            })?;

            if ids.contains_key(symbol) {
                log::warn!("Duplicate token {symbol:?} on line {}, keeping the first", lineno + 1);
                continue;
            }
            ids.insert(symbol.to_string(), id);
        }

        if ids.is_empty() {
            return Err(TtsError::Tokens("no tokens defined".to_string()));
        }

        Ok(Self { ids })
    }

    pub fn get(&self, symbol: &str) -> Option<i64> {
        self.ids.get(symbol).copied()
    }

    pub fn get_char(&self, ch: char) -> Option<i64> {
        let mut buf = [0u8; 4];
        self.get(ch.encode_utf8(&mut buf))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::TokenTable;
    use crate::TtsError;

    #[test]
    fn parses_symbols_and_space() {
        let table = TokenTable::parse("_ 0\n 1\na 2\nsil 3\nə 4\r\n").unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.get("_"), Some(0));
        assert_eq!(table.get(" "), Some(1));
        assert_eq!(table.get_char('a'), Some(2));
        assert_eq!(table.get("sil"), Some(3));
        assert_eq!(table.get_char('ə'), Some(4));
        assert_eq!(table.get("b"), None);
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        let table = TokenTable::parse("a 1 \nb 2\t\n 3  \n").unwrap();
        assert_eq!(table.get("a"), Some(1));
        assert_eq!(table.get("b"), Some(2));
        assert_eq!(table.get(" "), Some(3));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn first_definition_wins() {
        let table = TokenTable::parse("a 1\na 2\n").unwrap();
        assert_eq!(table.get("a"), Some(1));
    }

    #[test]
    fn rejects_non_integer_ids() {
        let err = TokenTable::parse("a one\n").unwrap_err();
        assert!(matches!(err, TtsError::Tokens(msg) if msg.contains("line 1")));
    }

    #[test]
    fn rejects_empty_tables() {
        assert!(matches!(
            TokenTable::parse("\n\n"),
            Err(TtsError::Tokens(_))
        ));
    }
}
