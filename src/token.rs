//! Token types for the training-session script lexer.

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Run,
    Repeat,
    Km,
    Kmh,
    Indefinitely,
    At,
    Times,

    // Literals
    Integer(u64),
    Float(f64),
    /// A `<mins>m<secs>s` literal, decoded to seconds.
    Duration(u32),
    /// A `(word)` display prefix, parentheses stripped.
    Prefix(String),

    // Punctuation
    LBrace,
    RBrace,
    Semi,
    Percent,
    /// The `+-` margin marker.
    MarginMarker,

    // Special
    Eof,
}
