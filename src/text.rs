//! Sentence splitting for long inputs.
//!
//! The engine is handed at most `max_num_sentences` sentences per call, so
//! long text is cut on sentence-final punctuation first.

fn is_sentence_end(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | ';' | '。' | '！' | '？' | '；' | '\n' | '\r')
}

fn is_numeric_connector_between_digits(text: &str, idx: usize, ch: char) -> bool {
    if ch != '.' {
        return false;
    }

    let prev = text[..idx].chars().next_back();
    let next = text[idx + ch.len_utf8()..].chars().next();

    matches!(
        (prev, next),
        (Some(left), Some(right)) if left.is_ascii_digit() && right.is_ascii_digit()
    )
}

/// Split text into trimmed, non-empty sentences.
///
/// Sentence-final punctuation stays attached to its sentence; line breaks are
/// boundaries and are dropped. A `.` between two digits is not a boundary.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (idx, ch) in text.char_indices() {
        if is_sentence_end(ch) && !is_numeric_connector_between_digits(text, idx, ch) {
            if ch != '\n' && ch != '\r' {
                current.push(ch);
            }
            flush(&mut sentences, &mut current);
            continue;
        }
        current.push(ch);
    }

    flush(&mut sentences, &mut current);
    sentences
}

fn flush(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    // A lone punctuation mark ("...", "!?") carries nothing to say.
    if !trimmed.is_empty() && trimmed.chars().any(|c| !is_sentence_end(c)) {
        sentences.push(trimmed.to_string());
    } else if let Some(last) = sentences.last_mut() {
        last.push_str(trimmed);
    }
    current.clear();
}

/// Group sentences into batches of at most `max_per_batch`, joined by a space.
pub fn batch_sentences(text: &str, max_per_batch: usize) -> Vec<String> {
    let sentences = split_sentences(text);
    sentences
        .chunks(max_per_batch.max(1))
        .map(|group| group.join(" "))
        .collect()
}
