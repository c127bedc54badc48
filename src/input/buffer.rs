// Keystroke buffer: characters accumulate until committed or cleared

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    chars: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one typed character. Whitespace is ignored; returns whether it was kept.
    pub fn push(&mut self, c: char) -> bool {
        if c.is_whitespace() || c.is_control() {
            return false;
        }
        self.chars.push(c);
        true
    }

    pub fn push_str(&mut self, s: &str) {
        for c in s.chars() {
            self.push(c);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    /// Take the buffered text (trimmed) and leave the buffer empty.
    pub fn commit(&mut self) -> String {
        let text = self.chars.trim().to_string();
        self.chars.clear();
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_skips_whitespace() {
        let mut buf = InputBuffer::new();
        assert!(buf.push('A'));
        assert!(!buf.push(' '));
        assert!(!buf.push('\n'));
        buf.push_str("b 1\t2");
        assert_eq!(buf.as_str(), "Ab12");
    }

    #[test]
    fn test_commit_empties_buffer() {
        let mut buf = InputBuffer::new();
        buf.push_str("ABCD");
        assert_eq!(buf.commit(), "ABCD");
        assert!(buf.is_empty());
        assert_eq!(buf.commit(), "");
    }

    #[test]
    fn test_clear_discards() {
        let mut buf = InputBuffer::new();
        buf.push_str("12");
        buf.clear();
        assert_eq!(buf.as_str(), "");
    }
}
