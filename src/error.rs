// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! Typed errors surfaced by the engine.
//!
//! Mirrors the grounding crate's `TokenError`/`ErrorCause` split
//! (`yash-arith/src/token.rs`, `yash-arith/src/lib.rs`): a small closed set
//! of `thiserror`-derived enums, no `Box<dyn Error>` at the public
//! boundary. Evaluation misses are not errors at all — they are `None`,
//! per spec.md §7 ("absent is the universal in-band failure signal for
//! reads").

use thiserror::Error;

/// Raised by a syntax-table mutation that would violate the "single
/// printable character, not the wildcard, not already bound elsewhere"
/// invariant (spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("character {0:?} is already bound to the {1} role")]
    CharacterInUse(char, &'static str),

    #[error("the wildcard character '*' cannot be assigned to the {0} role")]
    WildcardReserved(&'static str),

    #[error("{0:?} is not a valid character for the {1} role (must be a single printable, non-control character)")]
    NotPrintable(char, &'static str),
}

/// Raised by [`crate::tokenizer::tokenize`] on malformed path text
/// (spec.md §4.2 edge policies, §7 "Invalid path").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("unbalanced container in path")]
    UnbalancedContainer,

    #[error("path ends with an unresolved escape character")]
    TrailingEscape,

    #[error("prefix character with no following word")]
    PrefixWithoutWord,
}

/// Raised only by [`crate::engine::Engine::find_safe`] on detecting a
/// cycle in the value graph (spec.md §4.6, §7).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cycle detected while searching at path {0:?}")]
pub struct CycleDetected(pub String);
