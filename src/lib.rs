//! sessionc — compiles training-session scripts into Suunto watch-app code.
//!
//! Pipeline: lexer → parser → AST → code generator. One compile produces
//! two independent programs over the same AST: a "remaining" program
//! (time/distance left in the current step) and a "target" program
//! (above/below/on pace relative to a heart-rate or speed target).

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Session;
pub use codegen::Mode;
pub use error::CompileError;

use codegen::generate;
use lexer::Lexer;
use parser::Parser;

/// Separator printed between the two generated programs.
pub const SEPARATOR: &str = "------------------------------";

/// The two generated programs plus any recovered lexical diagnostics.
#[derive(Debug, Clone)]
pub struct CompiledSession {
    pub remaining: String,
    pub target: String,
    pub diagnostics: Vec<CompileError>,
}

impl CompiledSession {
    /// The full output: remaining program, separator line, target program.
    pub fn render(&self) -> String {
        format!("{}{}\n{}", self.remaining, SEPARATOR, self.target)
    }
}

/// The script compiler.
pub struct Compiler;

impl Compiler {
    /// Parse script source into a session AST. Lexical errors are recovered
    /// and returned alongside the session; a syntax error aborts the parse.
    pub fn parse(source: &str) -> Result<(Session, Vec<CompileError>), CompileError> {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        let session = Parser::new(tokens).parse()?;
        Ok((session, diagnostics))
    }

    /// Parse and generate both device programs.
    pub fn compile(source: &str) -> Result<CompiledSession, CompileError> {
        let (session, diagnostics) = Self::parse(source)?;
        Ok(CompiledSession {
            remaining: generate(&session, Mode::Remaining),
            target: generate(&session, Mode::Target),
            diagnostics,
        })
    }
}
