//! Code-point indexing over UTF-8 text
//!
//! Every offset exchanged between components counts Unicode scalar values,
//! not bytes. Regex engines and `String` editing work on bytes, so this
//! index converts in both directions.

/// Code-point to byte offset table for a borrowed string
#[derive(Debug, Clone)]
pub struct TextIndex<'a> {
    text: &'a str,
    /// offsets[i] is the byte offset of char i; the last entry is text.len()
    offsets: Vec<usize>,
}

impl<'a> TextIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of code points
    pub fn char_len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Byte offset of a code-point offset, clamped to the end of the text
    pub fn byte_offset(&self, char_offset: usize) -> usize {
        self.offsets[char_offset.min(self.char_len())]
    }

    /// Code-point offset of a byte offset. Offsets inside a multi-byte
    /// character round down to that character.
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        match self.offsets.binary_search(&byte_offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Slice by code-point offsets, clamped to the text
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let s = self.byte_offset(start);
        let e = self.byte_offset(end.max(start));
        &self.text[s..e]
    }

    /// First occurrence of `needle` lying entirely inside `[from, to)`
    /// (code points). Returns the code-point start.
    pub fn find_within(&self, needle: &str, from: usize, to: usize) -> Option<usize> {
        let window = self.slice(from, to);
        let base = self.byte_offset(from);
        window
            .find(needle)
            .map(|byte_pos| self.char_offset(base + byte_pos))
    }

    /// Code points in `needle`
    pub fn char_count(needle: &str) -> usize {
        needle.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_cyrillic() {
        let idx = TextIndex::new("г. Казань");
        assert_eq!(idx.char_len(), 9);
        assert_eq!(idx.byte_offset(3), 4);
        assert_eq!(idx.char_offset(4), 3);
        assert_eq!(idx.slice(3, 9), "Казань");
    }

    #[test]
    fn test_slice_clamps() {
        let idx = TextIndex::new("abc");
        assert_eq!(idx.slice(1, 99), "bc");
        assert_eq!(idx.slice(5, 2), "");
    }

    #[test]
    fn test_find_within_window() {
        let idx = TextIndex::new("Иван и Иван");
        assert_eq!(idx.find_within("Иван", 0, 11), Some(0));
        assert_eq!(idx.find_within("Иван", 1, 11), Some(7));
        assert_eq!(idx.find_within("Иван", 1, 10), None);
    }
}
