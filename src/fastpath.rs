// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! Fast-path resolver (C4): walks a flat dotted chain of plain names
//! against a value, for `simple` programs or complex-character-free text
//! (spec.md §4.4).

use crate::value::Value;

const FORBIDDEN_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

pub fn quick_get(root: &Value, names: &[&str]) -> Option<Value> {
    let mut current = root.clone();
    for name in names {
        if name.is_empty() {
            return None;
        }
        current = current.get_child(name)?;
    }
    Some(current)
}

/// Returns `true` iff the assignment succeeded. `force` materialises
/// missing intermediate maps; without it, a missing intermediate aborts
/// the write. Assignment to a prototype-sensitive name is rejected
/// without mutating anything (spec.md §4.4, §7 "Forbidden key").
pub fn quick_set(root: &mut Value, names: &[&str], new_value: Value, force: bool) -> bool {
    if names.iter().any(|n| n.is_empty()) {
        return false;
    }
    if names.iter().any(|n| FORBIDDEN_KEYS.contains(n)) {
        return false;
    }
    let Some((last, parents)) = names.split_last() else {
        return false;
    };

    let mut current = root;
    for name in parents {
        current = match descend_or_materialize(current, name, force) {
            Some(next) => next,
            None => return false,
        };
    }
    assign(current, last, new_value, force)
}

fn descend_or_materialize<'v>(
    current: &'v mut Value,
    name: &str,
    force: bool,
) -> Option<&'v mut Value> {
    let exists = match current {
        Value::Map(m) => m.contains_key(name),
        Value::Seq(s) => name.parse::<usize>().map(|i| i < s.len()).unwrap_or(false),
        _ => false,
    };
    if !exists {
        if !force {
            return None;
        }
        match current {
            Value::Map(m) => {
                m.insert(name.to_owned(), Value::empty_map());
            }
            Value::Seq(s) => {
                let idx: usize = name.parse().ok()?;
                while s.len() <= idx {
                    s.push(Value::Absent);
                }
                s[idx] = Value::empty_map();
            }
            _ => return None,
        }
    }
    match current {
        Value::Map(m) => m.get_mut(name),
        Value::Seq(s) => name.parse::<usize>().ok().and_then(move |i| s.get_mut(i)),
        _ => None,
    }
}

fn assign(current: &mut Value, name: &str, new_value: Value, force: bool) -> bool {
    match current {
        Value::Map(m) => {
            if !m.contains_key(name) && !force {
                return false;
            }
            m.insert(name.to_owned(), new_value);
            true
        }
        Value::Seq(s) => {
            let Ok(idx) = name.parse::<usize>() else {
                return false;
            };
            if idx >= s.len() {
                if !force {
                    return false;
                }
                while s.len() <= idx {
                    s.push(Value::Absent);
                }
            }
            s[idx] = new_value;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn root() -> Value {
        let mut foo = BTreeMap::new();
        foo.insert("bar".to_owned(), Value::from(1.0));
        let mut m = BTreeMap::new();
        m.insert("foo".to_owned(), Value::Map(foo));
        Value::Map(m)
    }

    #[test]
    fn quick_get_walks_a_dotted_chain() {
        assert_eq!(quick_get(&root(), &["foo", "bar"]), Some(Value::from(1.0)));
    }

    #[test]
    fn quick_get_on_missing_name_is_absent() {
        assert_eq!(quick_get(&root(), &["foo", "nope"]), None);
    }

    #[test]
    fn quick_set_without_force_refuses_missing_intermediate() {
        let mut r = Value::Map(BTreeMap::from([("a".to_owned(), Value::from(1.0))]));
        assert!(!quick_set(&mut r, &["b", "c", "d"], Value::from(9.0), false));
        assert_eq!(r, Value::Map(BTreeMap::from([("a".to_owned(), Value::from(1.0))])));
    }

    #[test]
    fn quick_set_with_force_materializes_intermediates() {
        let mut r = Value::Map(BTreeMap::from([("a".to_owned(), Value::from(1.0))]));
        assert!(quick_set(&mut r, &["b", "c", "d"], Value::from(9.0), true));
        let b = r.as_map().unwrap().get("b").unwrap();
        let c = b.as_map().unwrap().get("c").unwrap();
        assert_eq!(c.as_map().unwrap().get("d"), Some(&Value::from(9.0)));
    }

    #[test]
    fn quick_set_rejects_prototype_sensitive_keys() {
        let mut r = Value::empty_map();
        assert!(!quick_set(&mut r, &["__proto__"], Value::from(true), true));
        assert_eq!(r, Value::empty_map());
    }
}
