//! Lexer for the training-session script.
//!
//! Converts source text into a stream of [`Token`]s. Lexing never fails:
//! an unrecognized character is reported as a diagnostic, skipped, and
//! scanning continues with the next character.

use crate::error::CompileError;
use crate::token::{Token, TokenKind};

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("run", TokenKind::Run),
    ("repeat", TokenKind::Repeat),
    ("km", TokenKind::Km),
    ("kmh", TokenKind::Kmh),
    ("indefinitely", TokenKind::Indefinitely),
    ("at", TokenKind::At),
    ("times", TokenKind::Times),
];

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Scan the whole input. Returns the token vector (always terminated by
    /// an `Eof` token) together with any recovered lexical diagnostics.
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<CompileError>) {
        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();

        loop {
            self.skip_blank();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line: self.line,
                    col: self.col,
                });
                break;
            }

            let ch = self.peek();
            match ch {
                '{' => tokens.push(self.single_char(TokenKind::LBrace)),
                '}' => tokens.push(self.single_char(TokenKind::RBrace)),
                ';' => tokens.push(self.single_char(TokenKind::Semi)),
                '%' => tokens.push(self.single_char(TokenKind::Percent)),
                '+' if self.peek_next() == Some('-') => {
                    let line = self.line;
                    let col = self.col;
                    self.advance();
                    self.advance();
                    tokens.push(Token {
                        kind: TokenKind::MarginMarker,
                        line,
                        col,
                    });
                }
                '(' => match self.lex_prefix() {
                    Some(token) => tokens.push(token),
                    None => diagnostics.push(self.skip_illegal()),
                },
                '0'..='9' => match self.lex_number() {
                    Ok(token) => tokens.push(token),
                    Err(e) => diagnostics.push(e),
                },
                'a'..='z' | 'A'..='Z' => match self.lex_keyword() {
                    Some(token) => tokens.push(token),
                    None => diagnostics.push(self.skip_illegal()),
                },
                _ => diagnostics.push(self.skip_illegal()),
            }
        }

        (tokens, diagnostics)
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        self.col += 1;
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Skip whitespace, newlines (bumping the line counter) and `#` comments.
    fn skip_blank(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.col = 1;
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance();
        Token { kind, line, col }
    }

    /// Report the character at the current position as illegal and skip
    /// exactly that one character.
    fn skip_illegal(&mut self) -> CompileError {
        let line = self.line;
        let col = self.col;
        let ch = self.advance();
        CompileError::lex(format!("illegal character '{ch}'"), line, col)
    }

    /// Match a whole-word keyword at the current position. Returns `None`
    /// (without consuming anything) when the word is not a keyword.
    fn lex_keyword(&mut self) -> Option<Token> {
        let line = self.line;
        let col = self.col;
        let start = self.pos;

        let mut word = String::new();
        while !self.is_at_end() && is_word_char(self.peek()) {
            word.push(self.advance());
        }

        for (text, kind) in KEYWORDS {
            if word == *text {
                return Some(Token {
                    kind: kind.clone(),
                    line,
                    col,
                });
            }
        }

        self.pos = start;
        self.col = col;
        None
    }

    /// Lex a `(word)` prefix literal. Returns `None` (without consuming
    /// anything) when the parenthesized form is malformed.
    fn lex_prefix(&mut self) -> Option<Token> {
        let line = self.line;
        let col = self.col;
        let start = self.pos;

        self.advance(); // consume '('
        let mut word = String::new();
        while !self.is_at_end() && is_word_char(self.peek()) {
            word.push(self.advance());
        }

        if word.is_empty() || self.is_at_end() || self.peek() != ')' {
            self.pos = start;
            self.col = col;
            return None;
        }
        self.advance(); // consume ')'

        Some(Token {
            kind: TokenKind::Prefix(word),
            line,
            col,
        })
    }

    /// Lex a numeric literal: a `<mins>m<secs>s` duration is tried first,
    /// then `<digits>.<digits>`, then a bare integer.
    fn lex_number(&mut self) -> Result<Token, CompileError> {
        let line = self.line;
        let col = self.col;

        let mut digits = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            digits.push(self.advance());
        }

        if !self.is_at_end() && self.peek() == 'm' {
            if let Some(token) = self.lex_duration(&digits, line, col)? {
                return Ok(token);
            }
        }

        // seconds-only shorthand: "30s"
        if !self.is_at_end()
            && self.peek() == 's'
            && !self.peek_next().is_some_and(is_word_char)
        {
            self.advance(); // consume 's'
            let secs: u32 = digits
                .parse()
                .map_err(|_| CompileError::lex(format!("duration too large: {digits}s"), line, col))?;
            return Ok(Token {
                kind: TokenKind::Duration(secs),
                line,
                col,
            });
        }

        if !self.is_at_end()
            && self.peek() == '.'
            && self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            digits.push(self.advance()); // consume '.'
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                digits.push(self.advance());
            }
            let val: f64 = digits
                .parse()
                .map_err(|_| CompileError::lex(format!("invalid number: {digits}"), line, col))?;
            return Ok(Token {
                kind: TokenKind::Float(val),
                line,
                col,
            });
        }

        let val: u64 = digits
            .parse()
            .map_err(|_| CompileError::lex(format!("integer too large: {digits}"), line, col))?;
        Ok(Token {
            kind: TokenKind::Integer(val),
            line,
            col,
        })
    }

    /// Try to complete a duration literal after its minute digits; the
    /// current character is the `m`. Restores the position and yields
    /// `Ok(None)` when the `m<secs>s` tail does not match.
    fn lex_duration(
        &mut self,
        mins: &str,
        line: usize,
        col: usize,
    ) -> Result<Option<Token>, CompileError> {
        let start = self.pos;
        let start_col = self.col;

        self.advance(); // consume 'm'
        let mut secs = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            secs.push(self.advance());
        }

        if secs.is_empty() || self.is_at_end() || self.peek() != 's' {
            self.pos = start;
            self.col = start_col;
            return Ok(None);
        }
        self.advance(); // consume 's'

        let mins: u32 = mins
            .parse()
            .map_err(|_| CompileError::lex(format!("duration too large: {mins}m{secs}s"), line, col))?;
        let secs: u32 = secs
            .parse()
            .map_err(|_| CompileError::lex(format!("duration too large: {mins}m{secs}s"), line, col))?;
        let total = mins
            .checked_mul(60)
            .and_then(|m| m.checked_add(secs))
            .ok_or_else(|| {
                CompileError::lex(format!("duration too large: {mins}m{secs}s"), line, col)
            })?;

        Ok(Some(Token {
            kind: TokenKind::Duration(total),
            line,
            col,
        }))
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
