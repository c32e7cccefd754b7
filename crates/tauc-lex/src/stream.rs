//! Backtracking cursor over a token list.
//!
//! The grammar engine in `tauc-par` drives parsing entirely through
//! [`TokenStream`]: every rule alternative starts by [`TokenStream::mark`]ing
//! the current position, consumes tokens as its steps succeed, and either
//! [`TokenStream::pass`]es (keep the new position) or [`TokenStream::fail`]s
//! (rewind) depending on whether the whole alternative matched. `mark`/`fail`
//! calls always balance `mark`/`pass` calls across a well-formed parse, which
//! is the basis of the net-zero mark/pass invariant exercised in
//! `tauc-par`'s tests.

use crate::token::{Token, TokenKind};

/// Punctuators that never satisfy a generic [`TokenKind::Operator`] match —
/// a rule step that wants "any operator" must not accidentally swallow a
/// statement terminator or grouping delimiter. Rules that want one of these
/// ask for it by its literal instead.
const NON_GENERIC_PUNCTUATORS: &[&str] = &["(", ")", "[", "]", "{", "}", ";", ","];

/// A token list plus a backtracking cursor.
pub struct TokenStream<'a> {
    tokens: Vec<Token<'a>>,
    current: usize,
    marks: Vec<usize>,
    eof: Token<'a>,
}

impl<'a> TokenStream<'a> {
    /// Wrap a flat token list (as produced by [`crate::lexer::tokenize`],
    /// with whitespace and comments already filtered out).
    pub fn new(tokens: Vec<Token<'a>>, source_name: &'a str) -> Self {
        Self {
            tokens,
            current: 0,
            marks: Vec::new(),
            eof: Token::eof(source_name),
        }
    }

    /// The token at the cursor, without consuming it. Returns the sentinel
    /// EOF token once the cursor has passed the last real token.
    pub fn peek(&self) -> Token<'a> {
        self.tokens.get(self.current).copied().unwrap_or(self.eof)
    }

    /// True if the cursor has reached or passed the end of the stream.
    pub fn eof(&self) -> bool {
        self.current >= self.tokens.len()
    }

    /// Consume and return the token at the cursor, advancing it. Does
    /// nothing and returns the EOF sentinel once exhausted.
    pub fn consume(&mut self) -> Token<'a> {
        let tok = self.peek();
        if !self.eof() {
            self.current += 1;
        }
        tok
    }

    /// Consume the current token if its kind matches `kind`, honoring the
    /// punctuator exclusion rule for generic [`TokenKind::Operator`]
    /// matches.
    pub fn expect_kind(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        let tok = self.peek();
        if tok.kind != kind {
            return None;
        }
        if kind == TokenKind::Operator && NON_GENERIC_PUNCTUATORS.contains(&tok.literal) {
            return None;
        }
        Some(self.consume())
    }

    /// Consume the current token if its literal text matches exactly.
    pub fn expect_literal(&mut self, literal: &str) -> Option<Token<'a>> {
        if self.peek().literal == literal {
            Some(self.consume())
        } else {
            None
        }
    }

    /// Save the current cursor position. Must be paired with exactly one of
    /// [`Self::pass`] or [`Self::fail`].
    pub fn mark(&mut self) {
        self.marks.push(self.current);
    }

    /// Discard the most recent mark, keeping the cursor where it is. Used
    /// when the alternative started by the matching `mark` succeeded.
    pub fn pass(&mut self) {
        self.marks.pop();
    }

    /// Restore the cursor to the most recent mark and discard it. Used when
    /// the alternative started by the matching `mark` failed to match.
    pub fn fail(&mut self) {
        if let Some(pos) = self.marks.pop() {
            self.current = pos;
        }
    }

    /// Number of outstanding (unresolved) marks. Exercised by tests that
    /// check every `mark` is eventually paired off.
    pub fn open_marks(&self) -> usize {
        self.marks.len()
    }

    /// Current cursor position, exposed for grammar steps (like nested
    /// bracket grabbing) that need to slice raw tokens themselves.
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn tokens_from(&self, start: usize) -> &[Token<'a>] {
        &self.tokens[start..self.current.min(self.tokens.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks<'a>(lits: &[&'a str]) -> Vec<Token<'a>> {
        lits.iter()
            .enumerate()
            .map(|(i, l)| Token::new(l, TokenKind::Identifier, 1, i as u64 + 1, "t.tau"))
            .collect()
    }

    #[test]
    fn peek_past_end_returns_eof() {
        let stream = TokenStream::new(toks(&["a"]), "t.tau");
        assert_eq!(stream.peek().literal, "a");
    }

    #[test]
    fn consume_advances_and_eof_is_idempotent() {
        let mut stream = TokenStream::new(toks(&["a", "b"]), "t.tau");
        assert_eq!(stream.consume().literal, "a");
        assert_eq!(stream.consume().literal, "b");
        assert!(stream.eof());
        assert!(stream.consume().is_eof());
        assert!(stream.consume().is_eof());
    }

    #[test]
    fn mark_fail_restores_cursor() {
        let mut stream = TokenStream::new(toks(&["a", "b", "c"]), "t.tau");
        stream.consume();
        stream.mark();
        stream.consume();
        stream.consume();
        stream.fail();
        assert_eq!(stream.peek().literal, "b");
        assert_eq!(stream.open_marks(), 0);
    }

    #[test]
    fn mark_pass_keeps_cursor() {
        let mut stream = TokenStream::new(toks(&["a", "b"]), "t.tau");
        stream.mark();
        stream.consume();
        stream.pass();
        assert_eq!(stream.peek().literal, "b");
        assert_eq!(stream.open_marks(), 0);
    }

    #[test]
    fn nested_marks_unwind_independently() {
        let mut stream = TokenStream::new(toks(&["a", "b", "c"]), "t.tau");
        stream.mark();
        stream.consume();
        stream.mark();
        stream.consume();
        stream.fail(); // undo the inner consume only
        assert_eq!(stream.peek().literal, "b");
        stream.pass(); // keep the outer consume
        assert_eq!(stream.peek().literal, "b");
        assert_eq!(stream.open_marks(), 0);
    }

    #[test]
    fn generic_operator_match_excludes_punctuators() {
        let mut stream = TokenStream::new(
            vec![Token::new(";", TokenKind::Operator, 1, 1, "t.tau")],
            "t.tau",
        );
        assert!(stream.expect_kind(TokenKind::Operator).is_none());
        assert!(stream.expect_literal(";").is_some());
    }
}
