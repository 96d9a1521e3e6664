// File: src/core/context.rs

/// Left context for word-by-word rewriting: everything already emitted.
///
/// The joined text is maintained incrementally, so reading the context
/// before each word costs nothing and appending is amortised O(token).
#[derive(Debug, Clone, Default)]
pub struct ContextBuffer {
    tokens: Vec<String>,
    text: String,
}

impl ContextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(tokens: usize) -> Self {
        Self {
            tokens: Vec::with_capacity(tokens),
            text: String::new(),
        }
    }

    /// Appends one emitted token (possibly a spelled-out multi-word expression).
    pub fn push(&mut self, token: impl Into<String>) {
        let token = token.into();
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&token);
        self.tokens.push(token);
    }

    /// Context handed to the pipeline; `None` before the first token.
    pub fn context(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_space_separated_context() {
        let mut buffer = ContextBuffer::new();
        assert_eq!(buffer.context(), None);
        buffer.push("a");
        buffer.push("benign");
        assert_eq!(buffer.context(), Some("a benign"));
        buffer.push("heart attack");
        assert_eq!(buffer.as_str(), "a benign heart attack");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.into_tokens(), vec!["a", "benign", "heart attack"]);
    }
}
