//! Fixed-window text chunker with overlap.
//!
//! Splits document text into windows of `chunk_size` characters, each
//! starting `chunk_size - overlap` characters after the previous one, so
//! adjacent windows share `overlap` characters of context.
//!
//! # Algorithm
//!
//! 1. Validate `chunk_size > overlap` (the stride must be positive).
//! 2. Starting at offset 0, emit `text[offset .. offset + chunk_size]`.
//! 3. Advance the offset by the stride and repeat while it is inside the text.
//! 4. The last window holds whatever text remains and may be short.
//!
//! Offsets count Unicode scalar values, not bytes, so a window never ends
//! inside a multibyte character.
//!
//! # Example
//!
//! ```rust
//! use notes_rag_core::chunk::split_text;
//!
//! let text = "x".repeat(1000);
//! let windows = split_text(&text, 800, 120).unwrap();
//! assert_eq!(windows.len(), 2);
//! assert_eq!(windows[1].len(), 320);
//! ```

use crate::error::RagError;

/// Default window length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Default number of characters shared by adjacent windows.
pub const DEFAULT_OVERLAP: usize = 120;

/// Split `text` into overlapping windows.
///
/// Returns an empty vector for empty text.
///
/// # Errors
///
/// [`RagError::InvalidConfiguration`] when `chunk_size <= overlap`, which
/// would make the stride zero or negative.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>, RagError> {
    let stride = validate(chunk_size, overlap)?;

    // Byte offset of every char, plus the end of the string.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    let mut windows = Vec::with_capacity(char_len.div_ceil(stride));
    let mut offset = 0;
    while offset < char_len {
        let end = (offset + chunk_size).min(char_len);
        windows.push(text[bounds[offset]..bounds[end]].to_string());
        offset += stride;
    }

    Ok(windows)
}

/// Check chunker parameters and return the stride.
pub fn validate(chunk_size: usize, overlap: usize) -> Result<usize, RagError> {
    if chunk_size == 0 {
        return Err(RagError::invalid_config("chunk_size must be > 0"));
    }
    if overlap >= chunk_size {
        return Err(RagError::invalid_config(format!(
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }
    Ok(chunk_size - overlap)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the source text from windows by dropping each later
    /// window's overlapping prefix.
    fn reconstruct(windows: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, w) in windows.iter().enumerate() {
            if i == 0 {
                out.push_str(w);
            } else {
                out.extend(w.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_default_window_offsets() {
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let windows = split_text(&text, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0], text[..800]);
        assert_eq!(windows[1], text[680..]);
        assert_eq!(windows[1].chars().count(), 320);
    }

    #[test]
    fn test_thousand_a_small_windows() {
        let text = "A".repeat(1000);
        let windows = split_text(&text, 100, 20).unwrap();
        assert_eq!(windows.len(), 13);
        assert_eq!(windows[12].len(), 40);
        assert!(windows[..12].iter().all(|w| w.len() == 100));
    }

    #[test]
    fn test_count_formula() {
        // ceil(max(len - overlap, 0) / stride) on the long-text path
        for &(len, size, overlap) in &[(1000usize, 800usize, 120usize), (1000, 100, 20), (2500, 800, 120)] {
            let text = "z".repeat(len);
            let windows = split_text(&text, size, overlap).unwrap();
            let expected = (len - overlap).div_ceil(size - overlap);
            assert_eq!(windows.len(), expected, "len={} size={} overlap={}", len, size, overlap);
        }
    }

    #[test]
    fn test_reconstructs_text() {
        let text = "The mitochondria is the powerhouse of the cell. ".repeat(40);
        for &(size, overlap) in &[(800, 120), (100, 20), (7, 3), (10, 0), (1, 0)] {
            let windows = split_text(&text, size, overlap).unwrap();
            assert_eq!(reconstruct(&windows, overlap), text, "size={} overlap={}", size, overlap);
        }
    }

    #[test]
    fn test_short_text_single_window() {
        let windows = split_text("Hello, world!", 800, 120).unwrap();
        assert_eq!(windows, vec!["Hello, world!".to_string()]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_text("", 800, 120).unwrap().is_empty());
    }

    #[test]
    fn test_overlap_not_smaller_than_size_rejected() {
        assert!(matches!(
            split_text("abc", 10, 10),
            Err(RagError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            split_text("abc", 10, 25),
            Err(RagError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            split_text("abc", 0, 0),
            Err(RagError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──────┐ héllo wörld ✓ 日本語テキスト";
        let windows = split_text(text, 5, 2).unwrap();
        assert!(windows.iter().all(|w| w.chars().count() <= 5));
        assert_eq!(reconstruct(&windows, 2), text);
    }
}
