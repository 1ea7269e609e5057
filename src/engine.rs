// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! Public API surface (spec.md §6.2): wires the syntax table (C1), token
//! cache (C3), fast path (C4), and general evaluator (C5)/search (C6)
//! behind one embeddable `Engine`.

use std::rc::Rc;

use crate::cache::TokenCache;
use crate::error::{CycleDetected, TokenizeError};
use crate::eval;
use crate::fastpath;
use crate::program::Program;
use crate::search::{self, SearchMode};
use crate::syntax::{ContainerRole, PrefixRole, SeparatorRole, SyntaxTable};
use crate::tokenizer::tokenize;
use crate::value::Value;

/// An embeddable path engine. Owns its syntax table and token cache;
/// per spec.md §5 this is a single-threaded, not-`Sync` component —
/// concurrent embedders run one `Engine` per thread.
pub struct Engine {
    syntax: SyntaxTable,
    cache: TokenCache,
    force: bool,
    default_return: Value,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            syntax: SyntaxTable::new_default(),
            cache: TokenCache::new(),
            force: false,
            default_return: Value::Absent,
        }
    }

    /// Compiles `path`, consulting and populating the token cache
    /// (spec.md §4.3). A cache hit returns the very `Rc<Program>` handed
    /// out before, so a caller holding one keeps a valid view across
    /// later syntax mutations that swap the cache's contents.
    pub fn tokens(&mut self, path: &str) -> Result<Rc<Program>, TokenizeError> {
        if let Some(hit) = self.cache.get(path) {
            return Ok(hit);
        }
        let program = Rc::new(tokenize(path, &self.syntax)?);
        self.cache.insert(path.to_owned(), Rc::clone(&program));
        Ok(program)
    }

    pub fn valid(&mut self, path: &str) -> bool {
        self.tokens(path).is_ok()
    }

    /// Backslash-escapes every currently-special character in `segment`,
    /// including a literal backslash. `tokens(escape(s))` always
    /// compiles to a single-name program whose name is exactly `s`
    /// (spec.md §8 "Escape round-trip").
    pub fn escape(&self, segment: &str) -> String {
        let specials = &self.syntax.bundle().specials;
        let mut out = String::with_capacity(segment.len());
        for c in segment.chars() {
            if specials.contains(&c) {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    pub fn get(&mut self, root: &Value, path: &str, args: &[Value]) -> Value {
        self.get_with_default(root, path, self.default_return.clone(), args)
    }

    pub fn get_with_default(&mut self, root: &Value, path: &str, dflt: Value, args: &[Value]) -> Value {
        let Ok(program) = self.tokens(path) else {
            return dflt;
        };
        self.get_program(root, &program, args).unwrap_or(dflt)
    }

    /// As [`Engine::get`], but against an already-compiled [`Program`] —
    /// skips the tokenizer and cache entirely.
    pub fn get_program(&self, root: &Value, program: &Program, args: &[Value]) -> Option<Value> {
        if let Some(names) = program.simple_names() {
            fastpath::quick_get(root, &names)
        } else {
            eval::resolve_get(root, program, args)
        }
    }

    pub fn set(&mut self, root: &mut Value, path: &str, new_value: Value, args: &[Value]) -> bool {
        let Ok(program) = self.tokens(path) else {
            return false;
        };
        self.set_program(root, &program, new_value, args)
    }

    pub fn set_program(
        &self,
        root: &mut Value,
        program: &Program,
        new_value: Value,
        args: &[Value],
    ) -> bool {
        if let Some(names) = program.simple_names() {
            fastpath::quick_set(root, &names, new_value, self.force)
        } else {
            eval::resolve_set(root, program, new_value, args, self.force)
        }
    }

    pub fn find(&self, root: &Value, target: &Value, mode: SearchMode) -> Option<Value> {
        search::find(root, target, mode, &self.syntax)
    }

    pub fn find_safe(
        &self,
        root: &Value,
        target: &Value,
        mode: SearchMode,
    ) -> Result<Option<Value>, CycleDetected> {
        search::find_safe(root, target, mode, &self.syntax)
    }

    pub fn set_prefix(&mut self, role: PrefixRole, ch: char) -> Result<(), crate::error::ConfigError> {
        self.syntax.set_prefix(role, ch)?;
        self.cache.clear();
        Ok(())
    }

    pub fn set_separator(
        &mut self,
        role: SeparatorRole,
        ch: char,
    ) -> Result<(), crate::error::ConfigError> {
        self.syntax.set_separator(role, ch)?;
        self.cache.clear();
        Ok(())
    }

    pub fn set_container(
        &mut self,
        role: ContainerRole,
        open: char,
        close: char,
    ) -> Result<(), crate::error::ConfigError> {
        self.syntax.set_container(role, open, close)?;
        self.cache.clear();
        Ok(())
    }

    /// Replaces all four prefix characters in one atomic call — see
    /// [`SyntaxTable::set_prefix_group`].
    pub fn set_prefix_group(
        &mut self,
        parent: char,
        root: char,
        placeholder: char,
        context: char,
    ) -> Result<(), crate::error::ConfigError> {
        self.syntax.set_prefix_group(parent, root, placeholder, context)?;
        self.cache.clear();
        Ok(())
    }

    /// Replaces all three separator characters in one atomic call — see
    /// [`SyntaxTable::set_separator_group`].
    pub fn set_separator_group(
        &mut self,
        property: char,
        collection: char,
        each: char,
    ) -> Result<(), crate::error::ConfigError> {
        self.syntax.set_separator_group(property, collection, each)?;
        self.cache.clear();
        Ok(())
    }

    /// Replaces all five container opener/closer pairs in one atomic call
    /// — see [`SyntaxTable::set_container_group`].
    pub fn set_container_group(
        &mut self,
        property: (char, char),
        singlequote: (char, char),
        doublequote: (char, char),
        call: (char, char),
        eval_property: (char, char),
    ) -> Result<(), crate::error::ConfigError> {
        self.syntax
            .set_container_group(property, singlequote, doublequote, call, eval_property)?;
        self.cache.clear();
        Ok(())
    }

    pub fn reset_syntax_defaults(&mut self) {
        self.syntax.reset_defaults();
        self.cache.clear();
    }

    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.enabled()
    }

    pub fn set_force(&mut self, enabled: bool) {
        self.force = enabled;
    }

    pub fn force_enabled(&self) -> bool {
        self.force
    }

    pub fn set_simple_mode(&mut self, enabled: bool) {
        self.syntax.set_simple_mode(enabled);
        self.cache.clear();
    }

    pub fn simple_mode(&self) -> bool {
        self.syntax.simple_mode()
    }

    pub fn set_default_return(&mut self, value: Value) {
        self.default_return = value;
    }

    pub fn default_return(&self) -> &Value {
        &self.default_return
    }

    pub fn syntax(&self) -> &SyntaxTable {
        &self.syntax
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn get_set_round_trip_through_the_cache() {
        let mut engine = Engine::new();
        let mut root = Value::Map(BTreeMap::from([("a".to_owned(), Value::from(1.0))]));
        assert!(engine.set(&mut root, "a", Value::from(2.0), &[]));
        assert_eq!(engine.get(&root, "a", &[]), Value::from(2.0));
        assert_eq!(engine.cache_enabled(), true);
    }

    #[test]
    fn invalid_path_falls_back_to_configured_default() {
        let mut engine = Engine::new();
        engine.set_default_return(Value::from("fallback"));
        let root = Value::empty_map();
        assert_eq!(engine.get(&root, "foo[bar", &[]), Value::from("fallback"));
        assert!(!engine.valid("foo[bar"));
    }

    #[test]
    fn mutating_syntax_clears_the_cache() {
        let mut engine = Engine::new();
        engine.tokens("a.b").unwrap();
        assert_eq!(engine.cache.len(), 1);
        engine.set_prefix(PrefixRole::Parent, '#').unwrap();
        assert_eq!(engine.cache.len(), 0);
    }

    #[test]
    fn escape_round_trips_through_tokenize() {
        let mut engine = Engine::new();
        let s = "a.b[c]";
        let escaped = engine.escape(s);
        let program = engine.tokens(&escaped).unwrap();
        assert_eq!(program.simple_names(), Some(vec![s]));
    }

    #[test]
    fn prefix_group_swaps_roles_and_clears_the_cache() {
        let mut engine = Engine::new();
        engine.tokens("a.b").unwrap();
        assert_eq!(engine.cache.len(), 1);
        engine.set_prefix_group('~', '^', '%', '@').unwrap();
        assert_eq!(engine.cache.len(), 0);
        assert_eq!(engine.syntax().get_prefix(PrefixRole::Parent), '~');
        assert_eq!(engine.syntax().get_prefix(PrefixRole::Root), '^');
    }

    #[test]
    fn force_toggle_controls_forced_writes() {
        let mut engine = Engine::new();
        let mut root = Value::empty_map();
        assert!(!engine.set(&mut root, "a.b", Value::from(1.0), &[]));
        engine.set_force(true);
        assert!(engine.set(&mut root, "a.b", Value::from(1.0), &[]));
        assert_eq!(engine.get(&root, "a.b", &[]), Value::from(1.0));
    }
}
