//! Converts a source buffer into a flat list of [`Token`]s.
//!
//! [`tokenize`] tries, at each cursor position, a fixed sequence of scans in
//! this order: whitespace, comments (both skipped rather than emitted),
//! numeric literals, strings, characters, operators, then identifiers. The
//! first scan that recognizes the current character wins; there is no
//! backtracking within the lexer itself (all backtracking lives in the
//! grammar engine, over already-produced tokens).

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};
use thiserror::Error;

/// A lexing failure, tagged with the 1-based source position it occurred at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at line {row}, col {col}")]
    UnterminatedString { row: u64, col: u64 },

    #[error("unterminated character literal starting at line {row}, col {col}")]
    UnterminatedChar { row: u64, col: u64 },

    #[error("character literal at line {row}, col {col} must contain exactly one character or one \\xx escape")]
    InvalidCharLiteral { row: u64, col: u64 },

    #[error("unterminated block comment starting at line {row}, col {col}")]
    UnterminatedBlockComment { row: u64, col: u64 },

    #[error("unexpected character {ch:?} at line {row}, col {col}")]
    UnexpectedChar { ch: char, row: u64, col: u64 },
}

pub type LexResult<T> = Result<T, LexError>;

/// Longest-match table for multi-character operators, tried before the
/// single-character fallback. Order within a length class does not matter;
/// the scan always tries length 3, then 2, before falling back to 1.
const OPERATORS_3: &[&str] = &["<<=", ">>="];
const OPERATORS_2: &[&str] = &[
    "++", "--", "==", "!=", "<=", ">=", "<<", ">>", "&&", "||", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=",
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scans one source buffer. Construct with [`Lexer::new`] and drive with
/// [`Lexer::tokenize`]; there is no incremental/streaming API since the
/// grammar engine needs the whole token list up front to backtrack over.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    source_name: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, source_name: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            source_name,
        }
    }

    /// Tokenize the whole buffer. Whitespace and comments are consumed but
    /// never appear in the returned list.
    pub fn tokenize(&mut self) -> LexResult<Vec<Token<'a>>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.cursor.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }

    /// Skip whitespace and line/block comments, looping because a comment
    /// can be followed by more whitespace and vice versa.
    fn skip_trivia(&mut self) -> LexResult<()> {
        loop {
            let before = self.cursor.position();
            self.cursor.skip_whitespace();
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
            } else if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '*' {
                self.skip_block_comment()?;
            }
            if self.cursor.position() == before {
                return Ok(());
            }
        }
    }

    /// Consumes a `/* ... */` comment, tracking nesting depth so that
    /// `/* outer /* inner */ still outer */` is a single balanced comment
    /// rather than ending at the first `*/`.
    fn skip_block_comment(&mut self) -> LexResult<()> {
        let row = self.cursor.line() as u64;
        let col = self.cursor.column() as u64;
        self.cursor.advance_n(2); // "/*"
        let mut depth = 1usize;
        while depth > 0 {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedBlockComment { row, col });
            }
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '*' {
                self.cursor.advance_n(2);
                depth += 1;
            } else if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance_n(2);
                depth -= 1;
            } else {
                self.cursor.advance();
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> LexResult<Token<'a>> {
        let row = self.cursor.line() as u64;
        let col = self.cursor.column() as u64;
        let c = self.cursor.current_char();

        if c.is_ascii_digit() {
            return self.scan_number(row, col);
        }
        if c == '"' {
            return self.scan_string(row, col);
        }
        if c == '\'' {
            return self.scan_char(row, col);
        }
        if is_ident_start(c) {
            return Ok(self.scan_identifier(row, col));
        }
        self.scan_operator(row, col)
    }

    /// Scans a run of digits, then — only if a `.` is immediately followed
    /// by another digit — continues as a float. `1..2` therefore lexes as
    /// `Integer(1) Operator(.) Operator(.) Integer(2)`: a lone `.` not
    /// followed by a digit always belongs to the operator scanner, never to
    /// the number.
    fn scan_number(&mut self, row: u64, col: u64) -> LexResult<Token<'a>> {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let mut is_float = false;
        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            is_float = true;
            self.cursor.advance(); // '.'
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let literal = self.cursor.slice_from(start);
        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        Ok(Token::new(literal, kind, row, col, self.source_name))
    }

    /// `as` lexes as an [`TokenKind::Operator`] rather than an identifier so
    /// the grammar engine can match `x as i32` with a plain literal step,
    /// the same way it matches any other binary operator. Every other
    /// identifier-shaped lexeme, including ones merely starting with `as`
    /// (`assert`), stays `Identifier`.
    fn scan_identifier(&mut self, row: u64, col: u64) -> Token<'a> {
        let start = self.cursor.position();
        self.cursor.advance(); // ident start already checked
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let literal = self.cursor.slice_from(start);
        let kind = if literal == "as" {
            TokenKind::Operator
        } else {
            TokenKind::Identifier
        };
        Token::new(literal, kind, row, col, self.source_name)
    }

    /// String content is stored unquoted and already unescaped, so the
    /// emitter can write `"<content>"` back out verbatim without having to
    /// know the original quoting or escape sequences again.
    fn scan_string(&mut self, row: u64, col: u64) -> LexResult<Token<'a>> {
        self.cursor.advance(); // opening quote
        let content_start = self.cursor.position();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString { row, col });
            }
            match self.cursor.current_char() {
                '"' => break,
                '\\' => {
                    self.cursor.advance();
                    if self.cursor.is_at_end() {
                        return Err(LexError::UnterminatedString { row, col });
                    }
                    self.cursor.advance();
                }
                _ => self.cursor.advance(),
            }
        }
        let content = self.cursor.slice_from(content_start);
        self.cursor.advance(); // closing quote
        Ok(Token::new(content, TokenKind::String, row, col, self.source_name))
    }

    /// A character literal is `'x'` or `'\xx'` (a two-hex-digit escape). Any
    /// other length between the quotes is rejected, matching the exactly-3-
    /// or-exactly-5-byte rule the emitter relies on when it prints a char
    /// literal's code point.
    fn scan_char(&mut self, row: u64, col: u64) -> LexResult<Token<'a>> {
        self.cursor.advance(); // opening quote
        let content_start = self.cursor.position();
        if self.cursor.current_char() == '\\' {
            self.cursor.advance();
            self.cursor.advance_n(2); // two hex digits
        } else if !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        let content = self.cursor.slice_from(content_start);
        if self.cursor.current_char() != '\'' {
            return Err(if self.cursor.is_at_end() {
                LexError::UnterminatedChar { row, col }
            } else {
                LexError::InvalidCharLiteral { row, col }
            });
        }
        let is_valid = content.len() == 1 || (content.len() == 3 && content.starts_with('\\'));
        if !is_valid {
            return Err(LexError::InvalidCharLiteral { row, col });
        }
        self.cursor.advance(); // closing quote
        Ok(Token::new(content, TokenKind::Char, row, col, self.source_name))
    }

    fn scan_operator(&mut self, row: u64, col: u64) -> LexResult<Token<'a>> {
        let start = self.cursor.position();
        let c = self.cursor.current_char();

        let three: String = (0..3).map(|i| self.cursor.peek_char(i)).collect();
        if OPERATORS_3.contains(&three.as_str()) {
            self.cursor.advance_n(3);
            return Ok(Token::new(
                self.cursor.slice_from(start),
                TokenKind::Operator,
                row,
                col,
                self.source_name,
            ));
        }

        let two: String = (0..2).map(|i| self.cursor.peek_char(i)).collect();
        if OPERATORS_2.contains(&two.as_str()) {
            self.cursor.advance_n(2);
            return Ok(Token::new(
                self.cursor.slice_from(start),
                TokenKind::Operator,
                row,
                col,
                self.source_name,
            ));
        }

        if c.is_ascii_graphic() && c != '_' {
            self.cursor.advance();
            return Ok(Token::new(
                self.cursor.slice_from(start),
                TokenKind::Operator,
                row,
                col,
                self.source_name,
            ));
        }

        Err(LexError::UnexpectedChar { ch: c, row, col })
    }
}

/// Convenience wrapper around [`Lexer::new`] and [`Lexer::tokenize`].
pub fn tokenize<'a>(source: &'a str, source_name: &'a str) -> LexResult<Vec<Token<'a>>> {
    Lexer::new(source, source_name).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(src: &str) -> Vec<&str> {
        tokenize(src, "t.tau").unwrap().into_iter().map(|t| t.literal).collect()
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src, "t.tau").unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn skips_whitespace_and_line_comments() {
        assert_eq!(lits("  x // comment\n  y"), vec!["x", "y"]);
    }

    #[test]
    fn nested_block_comments_balance() {
        let toks = tokenize("x /* outer /* inner */ still outer */ y", "t.tau").unwrap();
        assert_eq!(toks.iter().map(|t| t.literal).collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(tokenize("x /* never closed", "t.tau").is_err());
    }

    #[test]
    fn integer_then_dots_then_integer() {
        assert_eq!(kinds("1..2"), vec![
            TokenKind::Integer,
            TokenKind::Operator,
            TokenKind::Operator,
            TokenKind::Integer
        ]);
        assert_eq!(lits("1..2"), vec!["1", ".", ".", "2"]);
    }

    #[test]
    fn float_requires_digit_after_dot() {
        assert_eq!(lits("3.14"), vec!["3.14"]);
        assert_eq!(kinds("3.14"), vec![TokenKind::Float]);
    }

    #[test]
    fn string_literal_is_stored_unquoted_and_unescaped_form() {
        let toks = tokenize(r#""hello \"world\"""#, "t.tau").unwrap();
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].literal, r#"hello \"world\""#);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("\"never closed", "t.tau").is_err());
    }

    #[test]
    fn plain_char_literal() {
        let toks = tokenize("'a'", "t.tau").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Char);
        assert_eq!(toks[0].literal, "a");
    }

    #[test]
    fn hex_escape_char_literal() {
        let toks = tokenize(r"'\ff'", "t.tau").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Char);
        assert_eq!(toks[0].literal, r"\ff");
    }

    #[test]
    fn overlong_char_literal_is_rejected() {
        assert!(tokenize("'ab'", "t.tau").is_err());
    }

    #[test]
    fn as_keyword_lexes_as_operator() {
        let toks = tokenize("x as i32", "t.tau").unwrap();
        assert_eq!(toks[1].kind, TokenKind::Operator);
        assert_eq!(toks[1].literal, "as");
    }

    #[test]
    fn identifier_with_as_prefix_is_not_split() {
        let toks = tokenize("assert", "t.tau").unwrap();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Identifier);
        assert_eq!(toks[0].literal, "assert");
    }

    #[test]
    fn longest_match_wins_for_multi_char_operators() {
        assert_eq!(lits(">>="), vec![">>="]);
        assert_eq!(lits(">>"), vec![">>"]);
        assert_eq!(lits(">"), vec![">"]);
    }

    #[test]
    fn punctuators_are_single_char_operators() {
        let toks = tokenize("(a, b);", "t.tau").unwrap();
        let ops: Vec<&str> = toks.iter().filter(|t| t.kind == TokenKind::Operator).map(|t| t.literal).collect();
        assert_eq!(ops, vec!["(", ",", ")", ";"]);
    }

    #[test]
    fn token_positions_track_lines() {
        let toks = tokenize("a\nb", "t.tau").unwrap();
        assert_eq!((toks[0].row, toks[0].col), (1, 1));
        assert_eq!((toks[1].row, toks[1].col), (2, 1));
    }
}
