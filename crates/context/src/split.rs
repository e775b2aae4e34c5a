//! Recursive character splitter.
//!
//! Splits a document into chunks of at most `chunk_size` characters,
//! preferring paragraph breaks, then line breaks, then word breaks, and
//! hard-cutting only when a single word exceeds the window. Consecutive
//! chunks share `overlap` trailing characters so sentences straddling a
//! boundary stay retrievable.

/// Separators tried in order of preference.
const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

/// Split `text` into chunks of at most `chunk_size` characters with
/// `overlap` characters carried over between consecutive chunks.
///
/// Chunks are trimmed; empty pieces are dropped. An empty or
/// whitespace-only input yields an empty vec.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    // Overlap is clamped below the window so merging always advances.
    let overlap = overlap.min(chunk_size.saturating_sub(1));
    let chunk_size = chunk_size.max(1);

    split_recursive(text, chunk_size, overlap, SEPARATORS)
        .into_iter()
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
        .collect()
}

fn split_recursive(
    text: &str,
    chunk_size: usize,
    overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.len() <= chunk_size {
        return vec![text.to_owned()];
    }

    let Some((sep, finer)) = separators.split_first() else {
        return hard_cut(text, chunk_size, overlap);
    };
    if !text.contains(sep) {
        return split_recursive(text, chunk_size, overlap, finer);
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for part in text.split(sep) {
        if part.len() > chunk_size {
            // A single piece larger than the window: flush what we have
            // and descend with finer separators.
            flush(&mut chunks, &mut current, overlap);
            chunks.extend(split_recursive(part, chunk_size, overlap, finer));
            current.clear();
            continue;
        }

        let joined_len = if current.is_empty() {
            part.len()
        } else {
            current.len() + sep.len() + part.len()
        };
        if joined_len > chunk_size && !current.is_empty() {
            flush(&mut chunks, &mut current, overlap);
        }

        if !current.is_empty() {
            current.push_str(sep);
        }
        current.push_str(part);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Push `current` as a finished chunk and reseed it with the chunk's
/// trailing `overlap` characters.
fn flush(chunks: &mut Vec<String>, current: &mut String, overlap: usize) {
    if current.is_empty() {
        return;
    }
    let chunk = std::mem::take(current);
    *current = tail(&chunk, overlap);
    chunks.push(chunk);
}

/// Last `max_chars` characters of `s`, cut at a char boundary.
fn tail(s: &str, max_chars: usize) -> String {
    if max_chars == 0 || s.len() <= max_chars {
        return if max_chars == 0 { String::new() } else { s.to_owned() };
    }
    let mut start = s.len() - max_chars;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    s[start..].to_owned()
}

/// Fixed-width windows with overlap, for text with no usable separator.
fn hard_cut(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        chunks.push(text[start..end].to_owned());
        if end == text.len() {
            break;
        }
        let mut next = start + step;
        while next < text.len() && !text.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = split_text("hello world", 1000, 200);
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(split_text("", 1000, 200).is_empty());
        assert!(split_text("   \n\n  ", 1000, 200).is_empty());
    }

    #[test]
    fn splits_on_paragraphs_first() {
        let text = format!("{}\n\n{}", "a".repeat(60), "b".repeat(60));
        let chunks = split_text(&text, 80, 0);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].chars().all(|c| c == 'a'));
        assert!(chunks[1].chars().all(|c| c == 'b'));
    }

    #[test]
    fn every_chunk_respects_the_window() {
        let text = "word ".repeat(500);
        for chunk in split_text(&text, 100, 20) {
            assert!(chunk.len() <= 100, "chunk too big: {}", chunk.len());
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text = "word ".repeat(500);
        let chunks = split_text(&text, 100, 20);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev_tail: String = pair[0].chars().rev().take(4).collect();
            let expected: String = prev_tail.chars().rev().collect();
            assert!(
                pair[1].starts_with(&expected),
                "overlap lost between chunks"
            );
        }
    }

    #[test]
    fn unbroken_text_is_hard_cut() {
        let text = "x".repeat(250);
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn hard_cut_handles_multibyte_boundaries() {
        let text = "é".repeat(150);
        for chunk in split_text(&text, 100, 10) {
            assert!(chunk.len() <= 100);
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn whole_document_content_is_preserved_without_overlap() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = split_text(text, 16, 0);
        let rejoined = chunks.join(" ");
        assert_eq!(rejoined, text);
    }
}
