//! The declarative, table-driven backtracking grammar engine.
//!
//! A [`Grammar`] maps a rule name to an ordered list of alternatives
//! ([`Rule`]s); each alternative is an ordered list of [`Step`]s plus an
//! [`Action`] invoked once every step in the alternative has matched.
//! Alternatives are tried in source order and the first full match wins
//! — no precedence climbing or operator tables live in the engine
//! itself, only in the rule set built on top of it (`crate::rules`).
//!
//! This intentionally has no operator-overloaded builder syntax: rule
//! sets are built from four plain constructors, [`lit`], [`kind`],
//! [`rule_ref`], and [`grab_nested`].

use std::collections::HashMap;
use tauc_lex::{TokenKind, TokenStream};
use tauc_sem::Scope;

use crate::node::Node;

/// One step of a rule alternative.
#[derive(Clone)]
pub enum Step {
    /// Consume one token iff its literal text equals `literal`.
    Literal { literal: &'static str, optional: bool, flag: Option<&'static str> },
    /// Consume one token iff its kind equals `kind`. Bound under `key` if
    /// given. Punctuator exclusion for a generic [`TokenKind::Operator`]
    /// match is enforced by [`TokenStream::expect_kind`] itself.
    Kind { kind: TokenKind, key: Option<&'static str>, optional: bool },
    /// Recursively evaluate another rule, binding its result under `key`.
    RuleRef { rule: &'static str, key: &'static str, optional: bool },
    /// Consume one `open` token, then collect every token up to and
    /// including the matching (depth-balanced) `close` token. The
    /// collected token literals (excluding the delimiters) are bound
    /// under `key` as [`Node::OrphanTokens`].
    NestedGrab { open: &'static str, close: &'static str, key: &'static str },
}

pub fn lit(literal: &'static str) -> Step {
    Step::Literal { literal, optional: false, flag: None }
}

pub fn lit_opt(literal: &'static str) -> Step {
    Step::Literal { literal, optional: true, flag: None }
}

/// Like [`lit_opt`], but additionally sets `flag` in the context when the
/// literal matches, so the alternative's action can later ask
/// [`ParserContext::take_flag`] whether it was present.
pub fn lit_opt_flag(literal: &'static str, flag: &'static str) -> Step {
    Step::Literal { literal, optional: true, flag: Some(flag) }
}

pub fn kind(k: TokenKind, key: &'static str) -> Step {
    Step::Kind { kind: k, key: Some(key), optional: false }
}

pub fn kind_unbound(k: TokenKind) -> Step {
    Step::Kind { kind: k, key: None, optional: false }
}

pub fn rule_ref(rule: &'static str, key: &'static str) -> Step {
    Step::RuleRef { rule, key, optional: false }
}

pub fn rule_ref_opt(rule: &'static str, key: &'static str) -> Step {
    Step::RuleRef { rule, key, optional: true }
}

pub fn grab_nested(open: &'static str, close: &'static str, key: &'static str) -> Step {
    Step::NestedGrab { open, close, key }
}

/// Named children bound by a matched alternative's steps, handed to its
/// [`Action`]. An action moves values out with [`View::take`]; whatever
/// is left when the alternative fails is simply dropped along with the
/// view.
#[derive(Default)]
pub struct View {
    children: HashMap<&'static str, Node>,
}

impl View {
    fn bind(&mut self, key: &'static str, node: Node) {
        self.children.insert(key, node);
    }

    pub fn take(&mut self, key: &str) -> Option<Node> {
        self.children.remove(key)
    }
}

/// Shared mutable state threaded through every action: the same context
/// the emitter later reuses for name qualification.
pub struct ParserContext<'a> {
    pub types: &'a mut tauc_sem::TypeRegistry,
    pub scope: &'a mut Scope,
    pub current_namescope: Vec<String>,
    pub errors: Vec<String>,
    /// Flags a literal step can set when it matches (e.g. a `pub`
    /// keyword), read by the action of the alternative it belongs to.
    pub flags: std::collections::HashSet<&'static str>,
}

impl<'a> ParserContext<'a> {
    pub fn new(types: &'a mut tauc_sem::TypeRegistry, scope: &'a mut Scope) -> Self {
        Self {
            types,
            scope,
            current_namescope: Vec::new(),
            errors: Vec::new(),
            flags: std::collections::HashSet::new(),
        }
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Remove and report whether `flag` was set by a literal step earlier
    /// in the current alternative. One-shot: calling this twice for the
    /// same flag after a single match returns `true` then `false`.
    pub fn take_flag(&mut self, flag: &str) -> bool {
        self.flags.remove(flag)
    }
}

pub type Action = dyn for<'a> Fn(&mut ParserContext<'a>, &mut View) -> Option<Node>;

pub struct Rule {
    pub steps: Vec<Step>,
    pub action: Box<Action>,
}

impl Rule {
    pub fn new(steps: Vec<Step>, action: Box<Action>) -> Self {
        Self { steps, action }
    }
}

/// A named collection of rule alternatives.
pub struct Grammar {
    rules: HashMap<&'static str, Vec<Rule>>,
}

impl Grammar {
    pub fn new() -> Self {
        Self { rules: HashMap::new() }
    }

    pub fn define(&mut self, name: &'static str, alternatives: Vec<Rule>) {
        self.rules.insert(name, alternatives);
    }

    /// Evaluate `rule_name` against `tokens` at the current cursor. On
    /// success, the cursor sits just past the matched alternative and the
    /// produced node is returned. On failure, the cursor is unchanged and
    /// `None` is returned (errors collected along abandoned alternatives
    /// are not fatal — only the final, outermost failure is reported).
    pub fn eval<'a>(
        &self,
        ctx: &mut ParserContext<'a>,
        tokens: &mut TokenStream,
        rule_name: &str,
    ) -> Option<Node> {
        let alternatives = self.rules.get(rule_name)?;
        'alt: for rule in alternatives {
            tokens.mark();
            let mut view = View::default();
            for step in &rule.steps {
                if !self.attempt_step(ctx, tokens, step, &mut view) {
                    tokens.fail();
                    continue 'alt;
                }
            }
            let errors_before = ctx.errors.len();
            let result = (rule.action)(ctx, &mut view);
            if ctx.errors.len() > errors_before || result.is_none() {
                tokens.fail();
                continue 'alt;
            }
            tokens.pass();
            return result;
        }
        None
    }

    fn attempt_step<'a>(
        &self,
        ctx: &mut ParserContext<'a>,
        tokens: &mut TokenStream,
        step: &Step,
        view: &mut View,
    ) -> bool {
        match step {
            Step::Literal { literal, optional, flag } => {
                if tokens.expect_literal(literal).is_some() {
                    if let Some(flag) = flag {
                        ctx.flags.insert(flag);
                    }
                    true
                } else {
                    *optional
                }
            }
            Step::Kind { kind: k, key, optional } => {
                if let Some(tok) = tokens.expect_kind(*k) {
                    if let Some(key) = key {
                        view.bind(key, Node::Token { literal: tok.literal.to_string(), kind: *k });
                    }
                    true
                } else {
                    *optional
                }
            }
            Step::RuleRef { rule, key, optional } => {
                match self.eval(ctx, tokens, rule) {
                    Some(node) => {
                        view.bind(key, node);
                        true
                    }
                    None => *optional,
                }
            }
            Step::NestedGrab { open, close, key } => {
                if tokens.expect_literal(open).is_none() {
                    return false;
                }
                let mut depth = 1usize;
                let mut collected = Vec::new();
                loop {
                    if tokens.eof() {
                        return false;
                    }
                    let tok = tokens.consume();
                    if tok.literal == *open {
                        depth += 1;
                    } else if tok.literal == *close {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    collected.push(tok.literal.to_string());
                }
                view.bind(key, Node::OrphanTokens(crate::ast::OrphanTokens { tokens: collected }));
                true
            }
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}
