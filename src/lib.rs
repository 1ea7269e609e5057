// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! `pathkit` — an embeddable path-expression engine for navigating and
//! mutating in-memory heterogeneous data graphs (maps, sequences,
//! scalars, callables) using compact textual paths such as
//! `users.0.name` or `["a.b"].*`.
//!
//! The engine is organized around six components (see `DESIGN.md` for
//! the full grounding ledger):
//!
//! - [`syntax`] — the configurable character table (prefixes,
//!   separators, container delimiters).
//! - [`program`] — the tokenizer's output types (`Step`/`Program`).
//! - [`tokenizer`] — compiles path text into a `Program`.
//! - [`cache`] — memoises `path text → Program` per engine instance.
//! - [`fastpath`] — walks plain dotted chains without the general
//!   evaluator's stack machinery.
//! - [`eval`] — the general evaluator: wildcards, collections, `doEach`,
//!   sub-programs, invocation.
//! - [`search`] — depth-first search for a path whose leaf equals a
//!   target value.
//! - [`value`] — the concrete `Value` graph and `Callable` trait.
//! - [`error`] — the typed error enums surfaced by fallible operations.
//! - [`engine`] — [`Engine`], the public entry point wiring all of the
//!   above.
//!
//! Evaluation misses are not errors: they are `None` (or, at the
//! `Engine` level, a configured default), per the "absent is the
//! universal in-band failure signal for reads" design rule. Only
//! malformed path text, a syntax-table collision, and a detected cycle
//! in `find_safe` are reported as `Err`.

pub mod cache;
pub mod engine;
pub mod error;
pub mod eval;
pub mod fastpath;
pub mod program;
pub mod search;
pub mod syntax;
pub mod tokenizer;
pub mod value;

pub use engine::Engine;
pub use error::{ConfigError, CycleDetected, TokenizeError};
pub use program::{Collection, ContainerOp, ModifiedName, Modifiers, Program, Step, SubProgram};
pub use search::SearchMode;
pub use syntax::{ContainerRole, PrefixRole, SeparatorRole, SyntaxTable};
pub use value::{CallError, Callable, Value};
