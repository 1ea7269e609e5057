// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! Search (C6): depth-first scan of a value graph for path(s) whose leaf
//! equals a target (spec.md §4.6). Independent of the tokenizer/cache —
//! it only borrows the syntax table's quoting rules to render the path
//! strings it emits.

use crate::error::CycleDetected;
use crate::syntax::{ContainerRole, SyntaxTable};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    First,
    All,
}

/// Depth-first, sorted-key search with no cycle guard. `mode: First`
/// halts on the first match; `All` collects every match in DFS order.
pub fn find(root: &Value, target: &Value, mode: SearchMode, syntax: &SyntaxTable) -> Option<Value> {
    let mut labels = Vec::new();
    let mut hits = Vec::new();
    walk(root, target, mode, syntax, &mut labels, &mut hits);
    finish(hits, mode)
}

/// As [`find`], but raises [`CycleDetected`] on ancestor re-entry instead
/// of looping forever.
pub fn find_safe(
    root: &Value,
    target: &Value,
    mode: SearchMode,
    syntax: &SyntaxTable,
) -> Result<Option<Value>, CycleDetected> {
    let mut labels = Vec::new();
    let mut hits = Vec::new();
    let mut ancestors: Vec<*const Value> = Vec::new();
    walk_safe(root, target, mode, syntax, &mut labels, &mut hits, &mut ancestors)?;
    Ok(finish(hits, mode))
}

fn finish(hits: Vec<String>, mode: SearchMode) -> Option<Value> {
    if hits.is_empty() {
        return None;
    }
    match mode {
        SearchMode::First => hits.into_iter().next().map(Value::from),
        SearchMode::All => Some(Value::Seq(hits.into_iter().map(Value::from).collect())),
    }
}

/// Returns `true` when the caller (a `First`-mode search) should stop.
fn walk(
    value: &Value,
    target: &Value,
    mode: SearchMode,
    syntax: &SyntaxTable,
    labels: &mut Vec<String>,
    hits: &mut Vec<String>,
) -> bool {
    match value {
        Value::Map(m) => {
            for (k, v) in m.iter() {
                labels.push(k.clone());
                let stop = walk(v, target, mode, syntax, labels, hits);
                labels.pop();
                if stop {
                    return true;
                }
            }
            false
        }
        Value::Seq(s) => {
            for (i, v) in s.iter().enumerate() {
                labels.push(i.to_string());
                let stop = walk(v, target, mode, syntax, labels, hits);
                labels.pop();
                if stop {
                    return true;
                }
            }
            false
        }
        leaf => {
            if leaf == target {
                hits.push(render_path(labels, syntax));
                mode == SearchMode::First
            } else {
                false
            }
        }
    }
}

fn walk_safe(
    value: &Value,
    target: &Value,
    mode: SearchMode,
    syntax: &SyntaxTable,
    labels: &mut Vec<String>,
    hits: &mut Vec<String>,
    ancestors: &mut Vec<*const Value>,
) -> Result<bool, CycleDetected> {
    match value {
        Value::Map(m) => {
            let ptr = value as *const Value;
            if ancestors.contains(&ptr) {
                return Err(CycleDetected(render_path(labels, syntax)));
            }
            ancestors.push(ptr);
            for (k, v) in m.iter() {
                labels.push(k.clone());
                let stop = walk_safe(v, target, mode, syntax, labels, hits, ancestors)?;
                labels.pop();
                if stop {
                    ancestors.pop();
                    return Ok(true);
                }
            }
            ancestors.pop();
            Ok(false)
        }
        Value::Seq(s) => {
            let ptr = value as *const Value;
            if ancestors.contains(&ptr) {
                return Err(CycleDetected(render_path(labels, syntax)));
            }
            ancestors.push(ptr);
            for (i, v) in s.iter().enumerate() {
                labels.push(i.to_string());
                let stop = walk_safe(v, target, mode, syntax, labels, hits, ancestors)?;
                labels.pop();
                if stop {
                    ancestors.pop();
                    return Ok(true);
                }
            }
            ancestors.pop();
            Ok(false)
        }
        leaf => {
            if leaf == target {
                hits.push(render_path(labels, syntax));
                Ok(mode == SearchMode::First)
            } else {
                Ok(false)
            }
        }
    }
}

fn render_path(labels: &[String], syntax: &SyntaxTable) -> String {
    let sep = syntax.property_sep().to_string();
    labels
        .iter()
        .map(|l| render_label(l, syntax))
        .collect::<Vec<_>>()
        .join(&sep)
}

/// Wraps a label in the singlequote container when it contains any
/// currently-special character (or is empty), escaping the container's
/// own closer and any backslash inside it.
fn render_label(label: &str, syntax: &SyntaxTable) -> String {
    let bundle = syntax.bundle();
    let needs_quote = label.is_empty() || label.chars().any(|c| bundle.specials.contains(&c));
    if !needs_quote {
        return label.to_owned();
    }
    let (open, close) = syntax.get_container(ContainerRole::SingleQuote);
    let mut out = String::new();
    out.push(open);
    for c in label.chars() {
        if c == close || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(close);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample() -> Value {
        let leaf_a = Value::Map(BTreeMap::from([("id".to_owned(), Value::from(1.0))]));
        let leaf_b = Value::Map(BTreeMap::from([("id".to_owned(), Value::from(2.0))]));
        Value::Map(BTreeMap::from([(
            "users".to_owned(),
            Value::Seq(vec![leaf_a, leaf_b]),
        )]))
    }

    #[test]
    fn finds_first_matching_leaf_path() {
        let root = sample();
        let syntax = SyntaxTable::new_default();
        let found = find(&root, &Value::from(2.0), SearchMode::First, &syntax);
        assert_eq!(found, Some(Value::from("users.1.id")));
    }

    #[test]
    fn all_mode_collects_every_match_in_dfs_order() {
        let root = Value::Map(BTreeMap::from([(
            "a".to_owned(),
            Value::Seq(vec![Value::from(1.0), Value::from(1.0), Value::from(2.0)]),
        )]));
        let syntax = SyntaxTable::new_default();
        let found = find(&root, &Value::from(1.0), SearchMode::All, &syntax).unwrap();
        assert_eq!(
            found,
            Value::Seq(vec![Value::from("a.0"), Value::from("a.1")])
        );
    }

    #[test]
    fn missing_target_is_absent() {
        let root = sample();
        let syntax = SyntaxTable::new_default();
        assert_eq!(find(&root, &Value::from(999.0), SearchMode::First, &syntax), None);
    }

    #[test]
    fn keys_containing_special_characters_are_quoted() {
        let root = Value::Map(BTreeMap::from([("a.b".to_owned(), Value::from(true))]));
        let syntax = SyntaxTable::new_default();
        let found = find(&root, &Value::from(true), SearchMode::First, &syntax);
        assert_eq!(found, Some(Value::from("'a.b'")));
    }

    #[test]
    fn find_safe_matches_find_on_an_acyclic_graph() {
        let root = sample();
        let syntax = SyntaxTable::new_default();
        assert_eq!(
            find_safe(&root, &Value::from(1.0), SearchMode::First, &syntax).unwrap(),
            find(&root, &Value::from(1.0), SearchMode::First, &syntax)
        );
    }
}
