//! Parser for the training-session script.
//!
//! Recursive descent over the token vector, one function per grammar
//! production:
//!
//! ```text
//! session  := step ';' | step ';' session
//! step     := RUN duration prefix?
//!           | RUN duration AT target prefix?
//!           | REPEAT INTEGER TIMES '{' session '}'
//! duration := FLOAT KM | INTEGER KM | INDEFINITELY | DURATION
//! target   := INTEGER '%' margin? | FLOAT KMH margin? | INTEGER KMH margin?
//! margin   := '+-' (INTEGER | FLOAT)
//! prefix   := PREFIX
//! ```
//!
//! A token that fits no production aborts the parse — this is a batch
//! compiler, there is no error recovery past the lexer.

use crate::ast::*;
use crate::error::CompileError;
use crate::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// The lexer always terminates its output with `Eof`; the sentinel is
    /// restored here if a caller hands over a vector without one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let (line, col) = tokens.last().map_or((1, 1), |t| (t.line, t.col));
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                col,
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Parse a whole script. The entire input must be consumed.
    pub fn parse(&mut self) -> Result<Session, CompileError> {
        let session = self.parse_session()?;
        let t = self.peek();
        if t.kind != TokenKind::Eof {
            return Err(CompileError::parse(
                format!("unexpected token after session: {:?}", t.kind),
                t.line,
                t.col,
            ));
        }
        Ok(session)
    }

    /// One or more `step ';'`, up to a closing brace or end of input.
    /// Steps are accumulated left to right, preserving source order.
    fn parse_session(&mut self) -> Result<Session, CompileError> {
        let mut steps = Vec::new();
        loop {
            steps.push(self.parse_step()?);
            self.expect(TokenKind::Semi)?;
            if self.check(TokenKind::RBrace) || self.check(TokenKind::Eof) {
                break;
            }
        }
        Ok(Session { steps })
    }

    fn parse_step(&mut self) -> Result<Step, CompileError> {
        let t = self.peek();
        match t.kind {
            TokenKind::Run => {
                self.advance();
                let clause = self.parse_duration()?;
                let target = if self.check(TokenKind::At) {
                    self.advance();
                    Some(self.parse_target()?)
                } else {
                    None
                };
                let prefix = self.parse_prefix();

                // The step prefix names the step on the watch face in both
                // generated programs, so it flows to the target as well.
                let target = target.map(|mut tg| {
                    tg.prefix = prefix.clone();
                    tg
                });
                let remaining = Remaining::new(clause, prefix);
                Ok(Step::Run(RunStep { remaining, target }))
            }
            TokenKind::Repeat => {
                self.advance();
                let (count, line, col) = self.expect_integer()?;
                if count == 0 {
                    return Err(CompileError::parse(
                        "repeat count must be at least 1",
                        line,
                        col,
                    ));
                }
                self.expect(TokenKind::Times)?;
                self.expect(TokenKind::LBrace)?;
                let body = self.parse_session()?;
                self.expect(TokenKind::RBrace)?;
                Ok(Step::Repeat(Repeat::new(count as u32, body.steps)))
            }
            _ => Err(CompileError::parse(
                format!("expected 'run' or 'repeat', got {}", describe(t)),
                t.line,
                t.col,
            )),
        }
    }

    fn parse_duration(&mut self) -> Result<DurationClause, CompileError> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Float(v) => {
                self.advance();
                self.expect(TokenKind::Km)?;
                Ok(DurationClause::Distance(v))
            }
            TokenKind::Integer(v) => {
                self.advance();
                self.expect(TokenKind::Km)?;
                Ok(DurationClause::Distance(v as f64))
            }
            TokenKind::Indefinitely => {
                self.advance();
                Ok(DurationClause::Lap)
            }
            TokenKind::Duration(secs) => {
                self.advance();
                Ok(DurationClause::Seconds(secs))
            }
            _ => Err(CompileError::parse(
                format!("expected a duration clause, got {}", describe(&t)),
                t.line,
                t.col,
            )),
        }
    }

    fn parse_target(&mut self) -> Result<Target, CompileError> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Integer(v) => {
                self.advance();
                let unit = self.peek().clone();
                match unit.kind {
                    TokenKind::Percent => {
                        self.advance();
                        let margin = self.parse_margin()?;
                        Ok(Target::heart_rate(v as f64, margin, None))
                    }
                    TokenKind::Kmh => {
                        self.advance();
                        let margin = self.parse_margin()?;
                        Ok(Target::speed(v as f64, margin, None))
                    }
                    _ => Err(CompileError::parse(
                        format!("expected '%' or 'kmh', got {}", describe(&unit)),
                        unit.line,
                        unit.col,
                    )),
                }
            }
            TokenKind::Float(v) => {
                self.advance();
                self.expect(TokenKind::Kmh)?;
                let margin = self.parse_margin()?;
                Ok(Target::speed(v, margin, None))
            }
            _ => Err(CompileError::parse(
                format!("expected a target clause, got {}", describe(&t)),
                t.line,
                t.col,
            )),
        }
    }

    fn parse_margin(&mut self) -> Result<Option<f64>, CompileError> {
        if !self.check(TokenKind::MarginMarker) {
            return Ok(None);
        }
        self.advance();
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Integer(v) => {
                self.advance();
                Ok(Some(v as f64))
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Some(v))
            }
            _ => Err(CompileError::parse(
                format!("expected a margin value after '+-', got {}", describe(&t)),
                t.line,
                t.col,
            )),
        }
    }

    fn parse_prefix(&mut self) -> Option<String> {
        if let TokenKind::Prefix(text) = &self.peek().kind {
            let text = text.clone();
            self.advance();
            Some(text)
        } else {
            None
        }
    }

    // --- Utility methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn check(&self, kind: TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, CompileError> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let t = self.peek();
            Err(CompileError::parse(
                format!("expected {kind:?}, got {}", describe(t)),
                t.line,
                t.col,
            ))
        }
    }

    fn expect_integer(&mut self) -> Result<(u64, usize, usize), CompileError> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Integer(v) => {
                self.advance();
                Ok((v, t.line, t.col))
            }
            _ => Err(CompileError::parse(
                format!("expected an integer, got {}", describe(&t)),
                t.line,
                t.col,
            )),
        }
    }
}

fn describe(t: &Token) -> String {
    match &t.kind {
        TokenKind::Eof => "end of input".to_string(),
        kind => format!("{kind:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<Session, CompileError> {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        Parser::new(tokens).parse()
    }

    fn only_run(session: &Session) -> &RunStep {
        assert_eq!(session.steps.len(), 1);
        match &session.steps[0] {
            Step::Run(run) => run,
            other => panic!("expected a run step, got {other:?}"),
        }
    }

    #[test]
    fn parse_distance_step() {
        let session = parse("run 5km;").unwrap();
        let run = only_run(&session);
        assert_eq!(run.remaining.distance, 5.0);
        assert_eq!(run.remaining.postfix, "km");
        assert!(run.target.is_none());
    }

    #[test]
    fn parse_float_distance_step() {
        let session = parse("run 2.5km;").unwrap();
        assert_eq!(only_run(&session).remaining.distance, 2.5);
    }

    #[test]
    fn parse_duration_step() {
        let session = parse("run 5m30s;").unwrap();
        let run = only_run(&session);
        assert_eq!(run.remaining.duration, 330);
        assert_eq!(run.remaining.postfix, "s");
    }

    #[test]
    fn parse_lap_step_with_prefix() {
        let session = parse("run indefinitely (cooldown);").unwrap();
        let run = only_run(&session);
        assert!(run.remaining.lap_terminated);
        assert_eq!(run.remaining.prefix, "cooldown");
    }

    #[test]
    fn parse_heart_rate_target() {
        let session = parse("run indefinitely at 80%;").unwrap();
        let target = only_run(&session).target.as_ref().unwrap();
        assert_eq!(target.heart_rate, 80.0);
        assert_eq!(target.hr_min, 79.0);
        assert_eq!(target.hr_max, 81.0);
    }

    #[test]
    fn parse_speed_target_with_margin() {
        let session = parse("run 10km at 12.5kmh +- 0.5;").unwrap();
        let target = only_run(&session).target.as_ref().unwrap();
        assert_eq!(target.speed, 12.5);
        assert_eq!(target.spd_min, 12.0);
        assert_eq!(target.spd_max, 13.0);
    }

    #[test]
    fn parse_integer_speed_target() {
        let session = parse("run 10km at 12kmh;").unwrap();
        let target = only_run(&session).target.as_ref().unwrap();
        assert_eq!(target.speed, 12.0);
    }

    #[test]
    fn parse_step_prefix_reaches_target() {
        let session = parse("run indefinitely at 80% (warmup);").unwrap();
        let run = only_run(&session);
        assert_eq!(run.remaining.prefix, "warmup");
        assert_eq!(run.target.as_ref().unwrap().effective_prefix(), "warmup");
    }

    #[test]
    fn parse_margin_defaults_to_one() {
        let session = parse("run 1km at 85%;").unwrap();
        let target = only_run(&session).target.as_ref().unwrap();
        assert_eq!(target.margin, 1.0);
    }

    #[test]
    fn parse_repeat_block() {
        let session = parse("repeat 3 times { run 1km; run 30s; };").unwrap();
        assert_eq!(session.steps.len(), 1);
        match &session.steps[0] {
            Step::Repeat(rep) => {
                assert_eq!(rep.count, 3);
                assert_eq!(rep.steps.len(), 2);
                assert_eq!(rep.step_count(), 2);
            }
            other => panic!("expected a repeat, got {other:?}"),
        }
    }

    #[test]
    fn parse_nested_repeat() {
        let session =
            parse("repeat 2 times { run 1km; repeat 3 times { run 0m30s; }; };").unwrap();
        match &session.steps[0] {
            Step::Repeat(rep) => assert_eq!(rep.step_count(), 4),
            other => panic!("expected a repeat, got {other:?}"),
        }
    }

    #[test]
    fn parse_steps_keep_source_order() {
        let session = parse("run 1km; run 2km; run 3km;").unwrap();
        let distances: Vec<f64> = session
            .steps
            .iter()
            .map(|s| match s {
                Step::Run(run) => run.remaining.distance,
                other => panic!("expected run steps, got {other:?}"),
            })
            .collect();
        assert_eq!(distances, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn parse_missing_semicolon_fails() {
        assert!(parse("run 5km").is_err());
    }

    #[test]
    fn parse_missing_duration_fails() {
        assert!(parse("run at 80%;").is_err());
    }

    #[test]
    fn parse_zero_repeat_fails() {
        assert!(parse("repeat 0 times { run 1km; };").is_err());
    }

    #[test]
    fn parse_unexpected_eof_fails() {
        let err = parse("repeat 3 times { run 1km;").unwrap_err();
        assert!(err.message.contains("end of input"), "{}", err.message);
    }

    #[test]
    fn parse_empty_input_fails() {
        assert!(parse("").is_err());
    }

    #[test]
    fn parse_empty_token_vector_fails_cleanly() {
        let err = Parser::new(Vec::new()).parse().unwrap_err();
        assert!(err.message.contains("end of input"), "{}", err.message);
    }

    #[test]
    fn parse_error_names_bad_token() {
        let err = parse("run 5km 7;").unwrap_err();
        assert!(err.message.contains("Integer"), "{}", err.message);
    }
}
