//! Text layout helpers for the fixed-width font

use alloc::string::String;
use alloc::vec::Vec;

/// Number of character cells that fit in `width` pixels
pub fn columns(width: i32, char_width: i32) -> usize {
    if width <= 0 || char_width <= 0 {
        return 0;
    }
    (width / char_width) as usize
}

/// Longest prefix of `text` that is at most `cols` characters
pub fn truncate(text: &str, cols: usize) -> &str {
    match text.char_indices().nth(cols) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Word-wrap `text` into lines of at most `cols` characters
///
/// Explicit newlines are kept. Words longer than a line are split.
pub fn wrap(text: &str, cols: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if cols == 0 {
        return lines;
    }

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut len = 0;

        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let mut word = word;
            let mut word_len = word.chars().count();

            if len > 0 && len + 1 + word_len > cols {
                lines.push(core::mem::take(&mut line));
                len = 0;
            }

            // Only reached on an empty line
            while word_len > cols {
                let head = truncate(word, cols);
                lines.push(String::from(head));
                word = &word[head.len()..];
                word_len -= cols;
            }

            if word_len > 0 {
                if len > 0 {
                    line.push(' ');
                    len += 1;
                }
                line.push_str(word);
                len += word_len;
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns() {
        assert_eq!(columns(320, 6), 53);
        assert_eq!(columns(-4, 6), 0);
        assert_eq!(columns(10, 0), 0);
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hi", 10), "hi");
        assert_eq!(truncate("héllo", 2), "hé");
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap("the quick brown fox", 10), ["the quick", "brown fox"]);
    }

    #[test]
    fn test_wrap_keeps_newlines() {
        assert_eq!(wrap("a\n\nb", 10), ["a", "", "b"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), ["abcd", "efgh", "ij"]);
        assert_eq!(wrap("ab cdefgh", 4), ["ab", "cdef", "gh"]);
    }

    #[test]
    fn test_wrap_zero_width() {
        assert!(wrap("anything", 0).is_empty());
    }
}
