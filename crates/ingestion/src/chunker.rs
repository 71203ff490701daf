//! Deterministic sliding-window chunker
//!
//! Splits text into fixed-size windows of `chunk_size` characters stepping
//! `chunk_size - chunk_overlap` forward each time. Offsets are character
//! offsets, not byte offsets, so multi-byte text chunks cleanly.

use cognita_common::errors::{AppError, Result};
use cognita_common::models::Chunk;

/// Split `text` into overlapping chunks.
///
/// Chunk ids are `{filename}_chunk_{index}` with a zero-based index. The
/// same input always produces the same chunk list. The final window is
/// truncated at the end of the text; a trailing window that would start at
/// or past the end is not emitted.
pub fn chunk_text(
    filename: &str,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(AppError::Config {
            message: "chunk_size must be greater than zero".to_string(),
        });
    }
    if chunk_overlap >= chunk_size {
        return Err(AppError::Config {
            message: format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                chunk_overlap, chunk_size
            ),
        });
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Ok(Vec::new());
    }

    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(Chunk {
            chunk_id: format!("{}_chunk_{}", filename, index),
            filename: filename.to_string(),
            index,
            text: chars[start..end].iter().collect(),
            start_char: start,
            end_char: end,
        });

        if end == chars.len() {
            break;
        }
        start += step;
        index += 1;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_windows() {
        // 2400 chars, size 1000, overlap 200: [0,1000) [800,1800) [1600,2400)
        let text = "x".repeat(2400);
        let chunks = chunk_text("doc.txt", &text, 1000, 200).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!((chunks[0].start_char, chunks[0].end_char), (0, 1000));
        assert_eq!((chunks[1].start_char, chunks[1].end_char), (800, 1800));
        assert_eq!((chunks[2].start_char, chunks[2].end_char), (1600, 2400));
        assert_eq!(chunks[0].chunk_id, "doc.txt_chunk_0");
        assert_eq!(chunks[2].chunk_id, "doc.txt_chunk_2");
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("doc.txt", "short", 1000, 200).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short");
        assert_eq!((chunks[0].start_char, chunks[0].end_char), (0, 5));
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let chunks = chunk_text("doc.txt", "", 1000, 200).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(matches!(
            chunk_text("doc.txt", "text", 100, 100).unwrap_err(),
            AppError::Config { .. }
        ));
        assert!(matches!(
            chunk_text("doc.txt", "text", 100, 150).unwrap_err(),
            AppError::Config { .. }
        ));
        assert!(matches!(
            chunk_text("doc.txt", "text", 0, 0).unwrap_err(),
            AppError::Config { .. }
        ));
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let text = "é".repeat(10);
        let chunks = chunk_text("doc.txt", &text, 4, 1).unwrap();
        assert_eq!(chunks[0].text.chars().count(), 4);
        assert_eq!(chunks[1].start_char, 3);
    }

    #[test]
    fn test_deterministic() {
        let text = "abcdef".repeat(300);
        let a = chunk_text("doc.txt", &text, 500, 100).unwrap();
        let b = chunk_text("doc.txt", &text, 500, 100).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.chunk_id, y.chunk_id);
            assert_eq!(x.text, y.text);
        }
    }

    #[test]
    fn test_exact_multiple_no_empty_trailing_chunk() {
        // 1800 chars, size 1000, step 800: [0,1000) [800,1800), no third
        let text = "x".repeat(1800);
        let chunks = chunk_text("doc.txt", &text, 1000, 200).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].end_char, 1800);
    }
}
