// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! General evaluator (C5): walks any [`Program`] against a value,
//! performing read, write, invocation, wildcard match, and
//! map-over-sequence (spec.md §4.5).
//!
//! The value stack (spec.md §3.5) is a plain `Vec<Value>` of clones:
//! position 0 is the root of the current evaluation, each later position
//! is the value resolved by the step before it. `parent`/`root` truncate
//! the stack directly rather than tracking a separate cursor, which keeps
//! "stack position top−n" a one-line slice operation. Every recursive
//! sub-evaluation (branch, nested program, call argument list) gets its
//! own freshly seeded stack, so frames never leak upward between calls —
//! the "entry-time frame depth" guarantee in spec.md §4.5 falls out of
//! Rust's ordinary call stack instead of needing an explicit mark/reset.

use crate::fastpath;
use crate::program::{Collection, ContainerOp, ModifiedName, Modifiers, Program, Step, SubProgram};
use crate::value::Value;

/// Reads `program` against `root`. Returns `None` on any unresolved step
/// (spec.md §7: "any step resolves to absent").
pub fn resolve_get(root: &Value, program: &Program, args: &[Value]) -> Option<Value> {
    let mut stack = vec![root.clone()];
    for step in &program.steps {
        let next = eval_step(step, &mut stack, args)?;
        stack.push(next);
    }
    Some(stack.last().unwrap().clone())
}

/// Writes `new_value` at the location(s) named by `program`'s final step.
/// Returns `true` iff every resulting target assignment succeeded
/// (spec.md §4.5 "Write semantics"; best-effort fan-out per
/// SPEC_FULL.md §9 resolution of the Collection-tail Open Question).
pub fn resolve_set(
    root: &mut Value,
    program: &Program,
    new_value: Value,
    args: &[Value],
    force: bool,
) -> bool {
    let Some((last, init)) = program.steps.split_last() else {
        return false;
    };

    let mut stack = vec![root.clone()];
    let mut keys: Vec<String> = Vec::new();
    for step in init {
        if track_step(step, &mut stack, &mut keys, args, force).is_none() {
            return false;
        }
    }

    let ctx = stack.last().unwrap().clone();
    let Some(targets) = final_targets(last, &ctx, &keys, args) else {
        return false;
    };
    if targets.is_empty() {
        return false;
    }

    let mut all_ok = true;
    for path in &targets {
        let refs: Vec<&str> = path.iter().map(String::as_str).collect();
        if !fastpath::quick_set(root, &refs, new_value.clone(), force) {
            all_ok = false;
        }
    }
    all_ok
}

fn eval_step(step: &Step, stack: &mut Vec<Value>, args: &[Value]) -> Option<Value> {
    match step {
        Step::Name(word) => lookup_or_wildcard(stack.last().unwrap(), word),
        Step::Modified(m) => eval_modified(m, stack, args),
        Step::Collection(c) => eval_collection(c, stack.last().unwrap(), args),
        Step::Sub(sub) => eval_sub(sub, stack, args),
    }
}

/// A single step evaluated against a standalone context, not a shared
/// stack — used for Collection branches, which spec.md §4.5 evaluates
/// "against the current context (not the stack)".
fn eval_single_step(step: &Step, ctx: &Value, args: &[Value]) -> Option<Value> {
    let mut stack = vec![ctx.clone()];
    eval_step(step, &mut stack, args)
}

fn lookup_or_wildcard(ctx: &Value, word: &str) -> Option<Value> {
    if ctx.is_callable() {
        return Some(Value::Str(word.to_owned()));
    }
    if let Some((prefix, suffix)) = wildcard_parts(word) {
        let keys = ctx.wildcard_keys(prefix, suffix);
        let values: Vec<Value> = keys.iter().filter_map(|k| ctx.get_child(k)).collect();
        return Some(Value::Seq(values));
    }
    ctx.get_child(word)
}

fn wildcard_parts(word: &str) -> Option<(&str, &str)> {
    let idx = word.find('*')?;
    Some((&word[..idx], &word[idx + 1..]))
}

fn apply_root_or_parent(mods: &Modifiers, stack: &mut Vec<Value>) -> Option<()> {
    if mods.root {
        stack.truncate(1);
    } else if mods.parent > 0 {
        let n = mods.parent as usize;
        if n >= stack.len() {
            return None;
        }
        stack.truncate(stack.len() - n);
    }
    Some(())
}

fn resolve_word(mods: &Modifiers, word: &str, args: &[Value]) -> Option<String> {
    match mods.placeholder {
        Some(k) => {
            let idx = (k as usize).checked_sub(1)?;
            args.get(idx)?.as_key_string()
        }
        None => Some(word.to_owned()),
    }
}

fn eval_modified(m: &ModifiedName, stack: &mut Vec<Value>, args: &[Value]) -> Option<Value> {
    apply_root_or_parent(&m.mods, stack)?;
    let word = resolve_word(&m.mods, &m.word, args)?;

    if let Some(k) = m.mods.context {
        let idx = (k as usize).checked_sub(1)?;
        return args.get(idx).cloned();
    }

    let ctx = stack.last().unwrap();
    if m.do_each {
        let items = ctx.as_seq()?;
        let results: Vec<Value> = items
            .iter()
            .map(|item| lookup_or_wildcard(item, &word).unwrap_or(Value::Absent))
            .collect();
        Some(Value::Seq(results))
    } else {
        lookup_or_wildcard(ctx, &word)
    }
}

fn eval_collection(c: &Collection, ctx: &Value, args: &[Value]) -> Option<Value> {
    if c.do_each {
        let items = ctx.as_seq()?;
        let mut outer = Vec::with_capacity(items.len());
        for item in items {
            let branch_values: Vec<Value> = c
                .branches
                .iter()
                .map(|b| eval_single_step(b, item, args).unwrap_or(Value::Absent))
                .collect();
            outer.push(Value::Seq(branch_values));
        }
        Some(Value::Seq(outer))
    } else {
        let values: Vec<Value> = c
            .branches
            .iter()
            .map(|b| eval_single_step(b, ctx, args).unwrap_or(Value::Absent))
            .collect();
        Some(Value::Seq(values))
    }
}

/// Extracts the literal word out of a quote sub-program (spec.md §4.5:
/// "the content is a literal name, already stripped at tokenize time").
fn literal_of(program: &Program) -> Option<String> {
    match program.steps.first() {
        Some(Step::Name(w)) => Some(w.clone()),
        _ => None,
    }
}

/// Evaluates a nested program used to feed an enclosing container
/// operation. A nested program consisting solely of a quoted literal is
/// *not* looked up against `ctx` — it evaluates directly to its literal
/// string value, which is how `["foo"]` ends up equivalent to `.foo`
/// rather than double-indirecting through `ctx["foo"]`. Any other nested
/// program (a bare name, a computed sub-expression, a collection) is
/// walked with the ordinary per-step dispatch, rooted at `ctx`.
fn resolve_program_from(ctx: &Value, program: &Program, args: &[Value]) -> Option<Value> {
    if program.steps.is_empty() {
        return Some(ctx.clone());
    }
    if program.steps.len() == 1 {
        if let Step::Sub(sub) = &program.steps[0] {
            if matches!(sub.op, ContainerOp::SingleQuote | ContainerOp::DoubleQuote) {
                return literal_of(&sub.program).map(Value::Str);
            }
        }
    }
    let mut stack = vec![ctx.clone()];
    let mut result = ctx.clone();
    for step in &program.steps {
        result = eval_step(step, &mut stack, args)?;
        stack.push(result.clone());
    }
    Some(result)
}

fn build_call_args(v: Option<Value>) -> Vec<Value> {
    match v {
        None | Some(Value::Absent) => Vec::new(),
        Some(Value::Seq(items)) => items,
        Some(other) => vec![other],
    }
}

fn eval_sub(sub: &SubProgram, stack: &mut Vec<Value>, args: &[Value]) -> Option<Value> {
    let ctx = stack.last().unwrap().clone();
    match sub.op {
        ContainerOp::SingleQuote | ContainerOp::DoubleQuote => {
            let word = literal_of(&sub.program)?;
            if sub.do_each {
                let items = ctx.as_seq()?;
                let results: Vec<Value> = items
                    .iter()
                    .map(|it| lookup_or_wildcard(it, &word).unwrap_or(Value::Absent))
                    .collect();
                Some(Value::Seq(results))
            } else {
                lookup_or_wildcard(&ctx, &word)
            }
        }
        ContainerOp::Property | ContainerOp::EvalProperty => {
            if sub.do_each {
                let items = ctx.as_seq()?.clone();
                let results: Vec<Value> = items
                    .iter()
                    .map(|item| match resolve_program_from(item, &sub.program, args) {
                        Some(nested_value) => match nested_value.as_key_string() {
                            Some(key) => lookup_or_wildcard(item, &key).unwrap_or(Value::Absent),
                            None => nested_value,
                        },
                        None => Value::Absent,
                    })
                    .collect();
                Some(Value::Seq(results))
            } else {
                let nested_value = resolve_program_from(&ctx, &sub.program, args)?;
                match nested_value.as_key_string() {
                    Some(key) => lookup_or_wildcard(&ctx, &key),
                    None => Some(nested_value),
                }
            }
        }
        ContainerOp::Call => {
            if sub.do_each {
                let callables = ctx.as_seq()?.clone();
                let owners = if stack.len() >= 2 {
                    stack[stack.len() - 2].as_seq().cloned()
                } else {
                    None
                };
                let args_value = if sub.program.steps.is_empty() {
                    None
                } else {
                    resolve_program_from(&ctx, &sub.program, args)
                };
                let call_args = build_call_args(args_value);
                let results: Vec<Value> = callables
                    .iter()
                    .enumerate()
                    .map(|(i, c)| match c.as_callable() {
                        Some(callable) => {
                            let receiver = owners.as_ref().and_then(|o| o.get(i));
                            callable.invoke(receiver, &call_args).unwrap_or(Value::Absent)
                        }
                        None => Value::Absent,
                    })
                    .collect();
                Some(Value::Seq(results))
            } else {
                let callable = ctx.as_callable()?.clone();
                let receiver = if stack.len() >= 2 {
                    stack.get(stack.len() - 2).cloned()
                } else {
                    None
                };
                let args_value = if sub.program.steps.is_empty() {
                    None
                } else {
                    resolve_program_from(&ctx, &sub.program, args)
                };
                let call_args = build_call_args(args_value);
                callable.invoke(receiver.as_ref(), &call_args).ok()
            }
        }
    }
}

// --- write-side navigation: mirrors the read dispatch above but also
// threads the absolute (from-true-root) key path needed to replay the
// same navigation as a mutable descent from the real root.

fn track_step(
    step: &Step,
    stack: &mut Vec<Value>,
    keys: &mut Vec<String>,
    args: &[Value],
    force: bool,
) -> Option<()> {
    match step {
        Step::Name(word) => push_tracked(stack, keys, word.clone(), |ctx| {
            lookup_or_wildcard(ctx, word)
        }, force),
        Step::Modified(m) => {
            apply_root_or_parent_tracked(&m.mods, stack, keys)?;
            if m.mods.context.is_some() || m.do_each {
                return None;
            }
            let word = resolve_word(&m.mods, &m.word, args)?;
            push_tracked(stack, keys, word.clone(), |ctx| lookup_or_wildcard(ctx, &word), force)
        }
        Step::Sub(sub) if matches!(sub.op, ContainerOp::Property | ContainerOp::EvalProperty) => {
            let ctx = stack.last().unwrap().clone();
            let nested = resolve_program_from(&ctx, &sub.program, args)?;
            let key = nested.as_key_string()?;
            push_tracked(stack, keys, key.clone(), |ctx| lookup_or_wildcard(ctx, &key), force)
        }
        Step::Sub(sub) if matches!(sub.op, ContainerOp::SingleQuote | ContainerOp::DoubleQuote) => {
            let word = literal_of(&sub.program)?;
            push_tracked(stack, keys, word.clone(), |ctx| lookup_or_wildcard(ctx, &word), force)
        }
        Step::Sub(_) | Step::Collection(_) => None,
    }
}

fn push_tracked(
    stack: &mut Vec<Value>,
    keys: &mut Vec<String>,
    key: String,
    lookup: impl FnOnce(&Value) -> Option<Value>,
    force: bool,
) -> Option<()> {
    let ctx = stack.last().unwrap();
    let next = match lookup(ctx) {
        Some(v) => v,
        None if force => Value::empty_map(),
        None => return None,
    };
    keys.push(key);
    stack.push(next);
    Some(())
}

fn apply_root_or_parent_tracked(
    mods: &Modifiers,
    stack: &mut Vec<Value>,
    keys: &mut Vec<String>,
) -> Option<()> {
    if mods.root {
        stack.truncate(1);
        keys.clear();
    } else if mods.parent > 0 {
        let n = mods.parent as usize;
        if n >= stack.len() || n > keys.len() {
            return None;
        }
        stack.truncate(stack.len() - n);
        keys.truncate(keys.len() - n);
    }
    Some(())
}

/// Computes the absolute key path(s) a write to the final step must
/// target. Fans out to more than one path for a `Collection` tail or a
/// `doEach`-tagged final step.
fn final_targets(
    step: &Step,
    ctx: &Value,
    keys: &[String],
    args: &[Value],
) -> Option<Vec<Vec<String>>> {
    match step {
        Step::Name(word) => Some(vec![append(keys, word.clone())]),
        Step::Modified(m) => {
            let mut local = keys.to_vec();
            if m.mods.root {
                local.clear();
            } else if m.mods.parent > 0 {
                let n = m.mods.parent as usize;
                if n > local.len() {
                    return None;
                }
                local.truncate(local.len() - n);
            }
            let word = resolve_word(&m.mods, &m.word, args)?;
            if m.do_each {
                let items = ctx.as_seq()?;
                Some(
                    (0..items.len())
                        .map(|i| {
                            let mut p = local.clone();
                            p.push(i.to_string());
                            p.push(word.clone());
                            p
                        })
                        .collect(),
                )
            } else {
                local.push(word);
                Some(vec![local])
            }
        }
        Step::Collection(c) => {
            let mut all = Vec::new();
            for branch in &c.branches {
                all.extend(final_targets(branch, ctx, keys, args)?);
            }
            Some(all)
        }
        Step::Sub(sub) if matches!(sub.op, ContainerOp::Property | ContainerOp::EvalProperty) => {
            let nested = resolve_program_from(ctx, &sub.program, args)?;
            let key = nested.as_key_string()?;
            Some(vec![append(keys, key)])
        }
        Step::Sub(sub) if matches!(sub.op, ContainerOp::SingleQuote | ContainerOp::DoubleQuote) => {
            let word = literal_of(&sub.program)?;
            Some(vec![append(keys, word)])
        }
        Step::Sub(_) => None,
    }
}

fn append(keys: &[String], last: String) -> Vec<String> {
    let mut v = keys.to_vec();
    v.push(last);
    v
}
