// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! The runtime value graph navigated and mutated by the engine.
//!
//! This is the crate's concrete instantiation of the "runtime value"
//! abstraction described by the specification: a recursively defined value
//! that is a map, a sequence, a scalar, or a callable. Embedders who need a
//! borrowed or wrapper representation instead are expected to build their
//! own type satisfying the same read/write/invoke shape; this module is
//! deliberately not generic over the value type, matching the "one concrete
//! instantiation for an owned JSON-like tree" guidance.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// An in-memory, heterogeneous, owned value graph.
///
/// `Value::Absent` is a *stored* absence (the map-value sense of "present
/// but empty handed"), distinct from the engine's lookup-failure sentinel,
/// which is `Option::None` returned by engine operations and never appears
/// as a `Value` variant.
#[derive(Clone)]
pub enum Value {
    /// A string-keyed map. `BTreeMap` gives sorted-key iteration for free,
    /// which the search component (C6) requires for stable output.
    Map(BTreeMap<String, Value>),
    /// A zero-based, ordered sequence.
    Seq(Vec<Value>),
    /// A string scalar.
    Str(String),
    /// A numeric scalar.
    Num(f64),
    /// A boolean scalar.
    Bool(bool),
    /// An explicit "no value" stored in the graph, as opposed to a missing
    /// key. Distinct from the engine's lookup-absence sentinel.
    Absent,
    /// An opaque invocable value.
    Callable(Rc<dyn Callable>),
}

impl Value {
    /// Convenience constructor for an empty map, used when materialising
    /// intermediate containers during a forced write.
    pub fn empty_map() -> Self {
        Value::Map(BTreeMap::new())
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    pub fn as_callable(&self) -> Option<&Rc<dyn Callable>> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    /// Stringifies a scalar for use as a computed property name or key.
    /// Non-scalars (maps, sequences, callables, absent) have no string
    /// form and yield `None`.
    pub fn as_key_string(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Num(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Reads a single child by name: map lookup by key, or sequence lookup
    /// by the name parsed as a zero-based index. Callables have no
    /// indexable children.
    pub fn get_child(&self, name: &str) -> Option<Value> {
        match self {
            Value::Map(m) => m.get(name).cloned(),
            Value::Seq(s) => name.parse::<usize>().ok().and_then(|i| s.get(i).cloned()),
            _ => None,
        }
    }

    /// Returns the ordered keys matching a single-wildcard template
    /// (`prefix*suffix`) against this value's own keys/indices.
    pub fn wildcard_keys(&self, prefix: &str, suffix: &str) -> Vec<String> {
        match self {
            Value::Map(m) => m
                .keys()
                .filter(|k| wildcard_matches(k, prefix, suffix))
                .cloned()
                .collect(),
            Value::Seq(s) => (0..s.len())
                .map(|i| i.to_string())
                .filter(|k| wildcard_matches(k, prefix, suffix))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Returns true iff `key` begins with `prefix` and ends with `suffix`
/// (the two pieces may overlap for very short keys, matching ordinary
/// substring-anchored wildcard semantics rather than a general glob).
pub fn wildcard_matches(key: &str, prefix: &str, suffix: &str) -> bool {
    key.starts_with(prefix) && key.ends_with(suffix) && key.len() >= prefix.len() + suffix.len()
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Map(m) => f.debug_map().entries(m.iter()).finish(),
            Value::Seq(s) => f.debug_list().entries(s.iter()).finish(),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Num(n) => write!(f, "Num({})", n),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Absent => write!(f, "Absent"),
            Value::Callable(_) => write!(f, "Callable(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Map(_) | Value::Seq(_) => write!(f, "{:?}", self),
            Value::Str(s) => s.fmt(f),
            Value::Num(n) => format_number(*n).fmt(f),
            Value::Bool(b) => b.fmt(f),
            Value::Absent => write!(f, "<absent>"),
            Value::Callable(_) => write!(f, "<callable>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Absent, Value::Absent) => true,
            (Value::Callable(a), Value::Callable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::Seq(iter.into_iter().map(Into::into).collect())
    }
}

/// Error produced by a [`Callable`] invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CallError(pub String);

/// Capability satisfied by any invocable [`Value`].
///
/// The receiver is the value that owned the callable at the call site
/// (spec §4.5: "the owner of the callable"), not the callable itself; it
/// is `None` when a callable is invoked with no recorded owner (e.g. a
/// callable sitting at the root of the value graph).
pub trait Callable {
    fn invoke(&self, receiver: Option<&Value>, args: &[Value]) -> Result<Value, CallError>;
}

impl<F> Callable for F
where
    F: Fn(Option<&Value>, &[Value]) -> Result<Value, CallError>,
{
    fn invoke(&self, receiver: Option<&Value>, args: &[Value]) -> Result<Value, CallError> {
        self(receiver, args)
    }
}
