//! Tokenizer for `tau` source: turns a source buffer into the flat,
//! backtrackable [`TokenStream`] the grammar engine in `tauc-par` parses
//! against.
//!
//! Tokenizing is a single forward pass with no lookahead beyond three
//! characters (for `<<=`/`>>=`); all of the engine's backtracking happens
//! one phase later, over the token list this crate produces.

pub mod cursor;
pub mod lexer;
pub mod stream;
pub mod token;

pub use lexer::{tokenize, LexError, LexResult, Lexer};
pub use stream::TokenStream;
pub use token::{Token, TokenKind};
