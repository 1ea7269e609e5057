// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! Tokenizer (C2): compiles path text into a [`Program`] under the
//! current [`SyntaxTable`] (spec.md §4.2).
//!
//! Pure and deterministic: the result depends only on `text` and the
//! syntax table in effect at the call. Follows the algorithm description
//! in spec.md §4.2 almost line for line: strip superfluous escapes inline,
//! fast-exit on no complex characters, otherwise a single left-to-right
//! scan with per-character effects.

use crate::error::TokenizeError;
use crate::program::{Collection, ContainerOp, Modifiers, Program, Step, SubProgram};
use crate::syntax::{ContainerRole, PrefixRole, SyntaxTable};

pub fn tokenize(text: &str, syntax: &SyntaxTable) -> Result<Program, TokenizeError> {
    if syntax.simple_mode() {
        return tokenize_simple(text, syntax.property_sep());
    }
    if text.is_empty() {
        return Ok(Program::empty());
    }
    if !syntax.bundle().complex_regex.is_match(text) {
        return tokenize_simple(text, syntax.property_sep());
    }
    scan(text, syntax)
}

fn tokenize_simple(text: &str, sep: char) -> Result<Program, TokenizeError> {
    if text.is_empty() {
        return Ok(Program::empty());
    }
    let words = split_escaped(text, sep)?;
    let mut program = Program {
        steps: words.into_iter().map(Step::Name).collect(),
        simple: false,
    };
    program.recompute_simple();
    Ok(program)
}

/// Splits `text` on `sep`, honouring escapes of `sep` and `\` itself and
/// dropping a backslash that precedes anything else (spec.md §4.2 step 1).
fn split_escaped(text: &str, sep: char) -> Result<Vec<String>, TokenizeError> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            match chars.get(i + 1) {
                Some(&next) => {
                    cur.push(next);
                    i += 2;
                }
                None => return Err(TokenizeError::TrailingEscape),
            }
        } else if c == sep {
            words.push(std::mem::take(&mut cur));
            i += 1;
        } else {
            cur.push(c);
            i += 1;
        }
    }
    words.push(cur);
    Ok(words)
}

fn make_step(word: String, mods: Modifiers, do_each: bool) -> Result<Step, TokenizeError> {
    let needs_literal_word =
        (mods.parent > 0 || mods.root) && mods.placeholder.is_none() && mods.context.is_none();
    if needs_literal_word && word.is_empty() {
        return Err(TokenizeError::PrefixWithoutWord);
    }
    if mods.is_empty() && !do_each {
        Ok(Step::Name(word))
    } else {
        Ok(Step::Modified(crate::program::ModifiedName {
            word,
            mods,
            do_each,
        }))
    }
}

fn prefix_role_for(syntax: &SyntaxTable, c: char) -> Option<PrefixRole> {
    for role in [
        PrefixRole::Parent,
        PrefixRole::Root,
        PrefixRole::Placeholder,
        PrefixRole::Context,
    ] {
        if syntax.get_prefix(role) == c {
            return Some(role);
        }
    }
    None
}

fn read_digits(chars: &[char], mut i: usize) -> (Option<u32>, usize) {
    let start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i == start {
        (None, i)
    } else {
        let s: String = chars[start..i].iter().collect();
        (s.parse::<u32>().ok(), i)
    }
}

fn apply_prefix(role: PrefixRole, mods: &mut Modifiers, chars: &[char], i: usize) -> usize {
    match role {
        PrefixRole::Parent => {
            mods.parent += 1;
            i
        }
        PrefixRole::Root => {
            mods.root = true;
            i
        }
        PrefixRole::Placeholder => {
            let (k, next) = read_digits(chars, i);
            mods.placeholder = Some(k.unwrap_or(0));
            next
        }
        PrefixRole::Context => {
            let (k, next) = read_digits(chars, i);
            mods.context = Some(k.unwrap_or(0));
            next
        }
    }
}

fn container_role_for(syntax: &SyntaxTable, c: char) -> Option<(ContainerRole, char, char)> {
    for role in [
        ContainerRole::Property,
        ContainerRole::SingleQuote,
        ContainerRole::DoubleQuote,
        ContainerRole::Call,
        ContainerRole::EvalProperty,
    ] {
        let (open, close) = syntax.get_container(role);
        if c == open {
            return Some((role, open, close));
        }
    }
    None
}

/// Scans the balanced span following an opener, returning its raw
/// (still-escaped) content and the index just past the matching closer.
/// Quote containers never nest and have their closer-escapes resolved
/// here (since their content is never recursively tokenized); other
/// containers keep escapes of their own delimiters raw for the
/// recursive `tokenize` call to resolve.
fn scan_container(
    chars: &[char],
    start: usize,
    open: char,
    close: char,
    is_quote: bool,
) -> Result<(String, usize), TokenizeError> {
    let mut i = start;
    let mut depth: usize = 1;
    let mut buf = String::new();
    loop {
        if i >= chars.len() {
            return Err(TokenizeError::UnbalancedContainer);
        }
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            let next = chars[i + 1];
            let escapes_delim = next == close || (!is_quote && next == open) || next == '\\';
            if escapes_delim {
                if is_quote {
                    buf.push(next);
                } else {
                    buf.push(c);
                    buf.push(next);
                }
                i += 2;
                continue;
            }
            if is_quote {
                buf.push(next);
            } else {
                buf.push(c);
                buf.push(next);
            }
            i += 2;
            continue;
        }
        if !is_quote && c == open {
            depth += 1;
            buf.push(c);
            i += 1;
            continue;
        }
        if c == close {
            depth -= 1;
            if depth == 0 {
                return Ok((buf, i + 1));
            }
            buf.push(c);
            i += 1;
            continue;
        }
        buf.push(c);
        i += 1;
    }
}

fn build_container_step(
    role: ContainerRole,
    subpath: String,
    do_each: bool,
    syntax: &SyntaxTable,
) -> Result<Step, TokenizeError> {
    let op = match role {
        ContainerRole::Property => ContainerOp::Property,
        ContainerRole::SingleQuote => ContainerOp::SingleQuote,
        ContainerRole::DoubleQuote => ContainerOp::DoubleQuote,
        ContainerRole::Call => ContainerOp::Call,
        ContainerRole::EvalProperty => ContainerOp::EvalProperty,
    };
    let program = if matches!(op, ContainerOp::SingleQuote | ContainerOp::DoubleQuote) {
        Program {
            steps: vec![Step::Name(subpath)],
            simple: true,
        }
    } else {
        tokenize(&subpath, syntax)?
    };
    Ok(Step::Sub(SubProgram {
        program,
        op,
        do_each,
    }))
}

#[allow(clippy::too_many_arguments)]
fn flush(
    steps: &mut Vec<Step>,
    pending: &mut Option<Vec<Step>>,
    pending_do_each: &mut bool,
    collection_do_each: &mut bool,
    word: &mut String,
    mods: &mut Modifiers,
    is_end: bool,
) -> Result<(), TokenizeError> {
    let w = std::mem::take(word);
    let m = std::mem::take(mods);
    let had_content = !w.is_empty() || !m.is_empty();

    if let Some(list) = pending.as_mut() {
        if had_content || is_end {
            list.push(make_step(w, m, false)?);
        }
        let branches = pending.take().unwrap();
        steps.push(Step::Collection(Collection {
            branches,
            do_each: *collection_do_each,
        }));
        *collection_do_each = false;
    } else if had_content {
        let do_each = std::mem::take(pending_do_each);
        steps.push(make_step(w, m, do_each)?);
    } else {
        *pending_do_each = false;
    }
    Ok(())
}

fn scan(text: &str, syntax: &SyntaxTable) -> Result<Program, TokenizeError> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let bundle = syntax.bundle();

    let mut steps: Vec<Step> = Vec::new();
    let mut pending: Option<Vec<Step>> = None;
    let mut collection_do_each = false;
    let mut word = String::new();
    let mut mods = Modifiers::default();
    let mut pending_do_each = false;

    let mut i = 0;
    while i < n {
        let c = chars[i];

        if c == '\\' {
            match chars.get(i + 1) {
                Some(&next) if bundle.specials.contains(&next) || next == '\\' => {
                    word.push(next);
                    i += 2;
                }
                Some(&next) => {
                    word.push(next);
                    i += 2;
                }
                None => return Err(TokenizeError::TrailingEscape),
            }
            continue;
        }

        if c == syntax.collection_sep() {
            let step = make_step(std::mem::take(&mut word), std::mem::take(&mut mods), false)?;
            let starting = pending.is_none();
            let list = pending.get_or_insert_with(Vec::new);
            if starting {
                collection_do_each = std::mem::take(&mut pending_do_each);
            }
            list.push(step);
            i += 1;
            continue;
        }

        if c == syntax.property_sep() {
            flush(
                &mut steps,
                &mut pending,
                &mut pending_do_each,
                &mut collection_do_each,
                &mut word,
                &mut mods,
                false,
            )?;
            i += 1;
            continue;
        }

        if c == syntax.each_sep() {
            flush(
                &mut steps,
                &mut pending,
                &mut pending_do_each,
                &mut collection_do_each,
                &mut word,
                &mut mods,
                false,
            )?;
            pending_do_each = true;
            i += 1;
            continue;
        }

        if word.is_empty() {
            if let Some(role) = prefix_role_for(syntax, c) {
                i = apply_prefix(role, &mut mods, &chars, i + 1);
                continue;
            }
        }

        if let Some((role, open, close)) = container_role_for(syntax, c) {
            let is_quote = matches!(role, ContainerRole::SingleQuote | ContainerRole::DoubleQuote);
            let (subpath, next_i) = scan_container(&chars, i + 1, open, close, is_quote)?;

            // A container glued directly onto a preceding word (`foo[bar]`,
            // `say("world")`) subscripts/calls onto that word rather than
            // being swallowed by it: flush the word as its own step first.
            if !word.is_empty() || !mods.is_empty() {
                let preceding = make_step(std::mem::take(&mut word), std::mem::take(&mut mods), false)?;
                match pending.as_mut() {
                    Some(list) => list.push(preceding),
                    None => steps.push(preceding),
                }
            }

            let do_each_here = std::mem::take(&mut pending_do_each);
            let sub_step = build_container_step(role, subpath, do_each_here, syntax)?;
            i = next_i;

            if i < n && chars[i] == syntax.collection_sep() {
                let starting = pending.is_none();
                let list = pending.get_or_insert_with(Vec::new);
                let branch_step = if starting {
                    collection_do_each = do_each_here;
                    match sub_step {
                        Step::Sub(mut sp) => {
                            sp.do_each = false;
                            Step::Sub(sp)
                        }
                        other => other,
                    }
                } else {
                    sub_step
                };
                list.push(branch_step);
                i += 1;
                continue;
            }
            if pending.is_some() {
                pending.as_mut().unwrap().push(sub_step);
                let branches = pending.take().unwrap();
                steps.push(Step::Collection(Collection {
                    branches,
                    do_each: collection_do_each,
                }));
                collection_do_each = false;
            } else {
                steps.push(sub_step);
            }
            continue;
        }

        word.push(c);
        i += 1;
    }

    flush(
        &mut steps,
        &mut pending,
        &mut pending_do_each,
        &mut collection_do_each,
        &mut word,
        &mut mods,
        true,
    )?;

    let mut program = Program {
        steps,
        simple: false,
    };
    program.recompute_simple();
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ModifiedName;

    fn names(p: &Program) -> Vec<String> {
        p.steps
            .iter()
            .map(|s| match s {
                Step::Name(n) => n.clone(),
                other => format!("{:?}", other),
            })
            .collect()
    }

    #[test]
    fn simple_dotted_path_fast_exits() {
        let syntax = SyntaxTable::new_default();
        let p = tokenize("foo.bar.qux.baz", &syntax).unwrap();
        assert!(p.simple);
        assert_eq!(names(&p), vec!["foo", "bar", "qux", "baz"]);
    }

    #[test]
    fn bracketed_literal_quotes_behave_like_dotted_names() {
        let syntax = SyntaxTable::new_default();
        let p = tokenize(r#"["foo"]["bar"]"#, &syntax).unwrap();
        assert_eq!(p.steps.len(), 2);
        for step in &p.steps {
            match step {
                Step::Sub(sub) => {
                    assert_eq!(sub.op, ContainerOp::Property);
                    assert_eq!(sub.program.steps.len(), 1);
                }
                other => panic!("expected a Sub step, got {:?}", other),
            }
        }
    }

    #[test]
    fn comma_inside_or_outside_brackets_both_yield_one_collection() {
        let syntax = SyntaxTable::new_default();
        let a = tokenize("foo[bar],[baz]", &syntax).unwrap();
        let b = tokenize("foo[bar,baz]", &syntax).unwrap();
        assert_eq!(a.steps.len(), 2);
        assert!(matches!(a.steps[1], Step::Collection(_)));
        assert_eq!(b.steps.len(), 2);
    }

    #[test]
    fn each_separator_marks_the_next_step() {
        let syntax = SyntaxTable::new_default();
        let p = tokenize("users<n", &syntax).unwrap();
        assert_eq!(p.steps.len(), 2);
        match &p.steps[1] {
            Step::Modified(ModifiedName { word, do_each, .. }) => {
                assert_eq!(word, "n");
                assert!(do_each);
            }
            other => panic!("expected Modified(n) with do_each, got {:?}", other),
        }
    }

    #[test]
    fn each_tagged_container_starting_a_collection_lifts_do_each_to_the_collection() {
        let syntax = SyntaxTable::new_default();
        let p = tokenize("users<[n],[m]", &syntax).unwrap();
        assert_eq!(p.steps.len(), 2);
        match &p.steps[1] {
            Step::Collection(c) => {
                assert!(c.do_each);
                assert_eq!(c.branches.len(), 2);
                for branch in &c.branches {
                    match branch {
                        Step::Sub(sub) => assert!(!sub.do_each),
                        other => panic!("expected a Sub branch, got {:?}", other),
                    }
                }
            }
            other => panic!("expected a Collection step, got {:?}", other),
        }
    }

    #[test]
    fn trailing_escape_is_rejected() {
        let syntax = SyntaxTable::new_default();
        assert_eq!(tokenize(r"foo\", &syntax), Err(TokenizeError::TrailingEscape));
    }

    #[test]
    fn unbalanced_container_is_rejected() {
        let syntax = SyntaxTable::new_default();
        assert_eq!(
            tokenize("foo[bar", &syntax),
            Err(TokenizeError::UnbalancedContainer)
        );
    }

    #[test]
    fn prefix_without_word_is_rejected() {
        let syntax = SyntaxTable::new_default();
        assert_eq!(tokenize("^.foo", &syntax), Err(TokenizeError::PrefixWithoutWord));
    }

    #[test]
    fn empty_path_is_an_empty_program() {
        let syntax = SyntaxTable::new_default();
        let p = tokenize("", &syntax).unwrap();
        assert!(p.steps.is_empty());
        assert!(p.simple);
    }

    #[test]
    fn placeholder_prefix_parses_its_numeric_index() {
        let syntax = SyntaxTable::new_default();
        let p = tokenize("%1", &syntax).unwrap();
        match &p.steps[0] {
            Step::Modified(ModifiedName { mods, .. }) => assert_eq!(mods.placeholder, Some(1)),
            other => panic!("expected Modified, got {:?}", other),
        }
    }
}
