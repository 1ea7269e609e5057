// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! Token program types: the tokenizer's (C2) output, walked by the fast
//! path (C4) and the general evaluator (C5).
//!
//! Grounded in the "tagged variants for steps" redesign note (spec.md §9):
//! a sum type rather than a duck-typed object with optional fields, in the
//! style of `yash-arith`'s `ast.rs` token/operator enums.

/// The bracket-like container an evaluated [`SubProgram`] feeds back into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerOp {
    /// `[...]` — evaluate the nested program, use the result as a name.
    Property,
    /// `(...)` — evaluate the nested program to an argument list, invoke.
    Call,
    /// `{...}` — evaluate the nested program, use the result as a
    /// computed key into the current context.
    EvalProperty,
    /// `'...'` — content taken verbatim at tokenize time.
    SingleQuote,
    /// `"..."` — content taken verbatim at tokenize time.
    DoubleQuote,
}

/// Prefix modifiers carried by a [`ModifiedName`] (spec.md §3.2, §4.5).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Number of stacked `parent` prefixes (0 if absent).
    pub parent: u32,
    /// `root` prefix present.
    pub root: bool,
    /// `placeholder(k)`: substitutes the word with `args[k-1]` stringified.
    /// `k` is 1-based per the external grammar; `None` if absent.
    pub placeholder: Option<u32>,
    /// `context(k)`: replaces the step's result with `args[k-1]` raw.
    pub context: Option<u32>,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        *self == Modifiers::default()
    }
}

/// A name carrying one or more prefix modifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModifiedName {
    pub word: String,
    pub mods: Modifiers,
    pub do_each: bool,
}

/// An ordered, non-empty fan-out of sub-steps (spec.md §3.3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub branches: Vec<Step>,
    pub do_each: bool,
}

/// A nested program whose evaluated result feeds a container operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubProgram {
    pub program: Program,
    pub op: ContainerOp,
    pub do_each: bool,
}

/// One unit of navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Name(String),
    Modified(ModifiedName),
    Collection(Collection),
    Sub(SubProgram),
}

impl Step {
    /// True iff this step is a plain, unmodified [`Step::Name`] — the
    /// condition a [`Program`] must satisfy everywhere to be `simple`.
    pub fn is_plain_name(&self) -> bool {
        matches!(self, Step::Name(_))
    }
}

/// A compiled path: an ordered sequence of steps plus the derived
/// `simple` flag (spec.md §3.3, GLOSSARY).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub steps: Vec<Step>,
    pub simple: bool,
}

impl Program {
    pub fn empty() -> Self {
        Program {
            steps: Vec::new(),
            simple: true,
        }
    }

    /// Recomputes `simple` from the current steps: true iff every step is
    /// a plain [`Step::Name`].
    pub fn recompute_simple(&mut self) {
        self.simple = self.steps.iter().all(Step::is_plain_name);
    }

    /// Names of every step, if this program is simple — used by the fast
    /// path, which only ever walks plain dotted chains.
    pub fn simple_names(&self) -> Option<Vec<&str>> {
        if !self.simple {
            return None;
        }
        self.steps
            .iter()
            .map(|s| match s {
                Step::Name(n) => Some(n.as_str()),
                _ => None,
            })
            .collect()
    }
}
