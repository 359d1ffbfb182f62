//! Sentence chunking for engines that only synthesize whole strings.
//!
//! Feeding such an engine one sentence-sized piece at a time turns it into
//! a chunked streaming engine: the first audio is ready after the first
//! sentence instead of after the whole text.

/// Default upper bound on characters per text chunk.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 200;

/// Split `text` into chunks of at most `max_chars` bytes.
///
/// Sentences are packed together while they fit. A sentence longer than
/// the limit is split at clause punctuation, then at word boundaries, and
/// as a last resort at a character boundary.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if !current.is_empty() && current.len() + 1 + sentence.len() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        if sentence.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_long_sentence(sentence, max_chars));
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// ── Internal helpers ───────────────────────────────────────────────

/// Split after `.`, `!` or `?` when followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(next_i, next)) = chars.peek() {
                if next.is_whitespace() {
                    let sentence = text[start..next_i].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = next_i;
                }
            }
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

fn split_long_sentence(sentence: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for clause in sentence.split_inclusive([',', ';', ':']) {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        if !current.is_empty() && current.len() + 1 + clause.len() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if clause.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_at_words(clause, max_chars));
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(clause);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_at_words(clause: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in clause.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if word.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(hard_split(word, max_chars));
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Cut at the last char boundary that fits; always makes progress.
fn hard_split(word: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = word;
    while !rest.is_empty() {
        let mut end = max_chars.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        chunks.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    chunks
}
