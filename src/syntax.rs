// This file is part of pathkit, an embeddable path-expression engine.
// Copyright (C) 2026 PathKit Contributors

//! Syntax table (C1): role→character bindings and their derived
//! recognition predicates.
//!
//! Mutation always goes through [`SyntaxTable`]'s setters, which validate
//! the incoming character, update the role map, and rebuild the
//! [`SyntaxBundle`] — the immutable, `Rc`-shared snapshot consulted by the
//! tokenizer on every call (spec.md §4.1, §5 "Ambient" note in
//! SPEC_FULL.md on using `Rc` rather than an atomic pointer).

use std::collections::HashSet;
use std::rc::Rc;

use regex::Regex;

use crate::error::ConfigError;

/// A prefix role (spec.md §3.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrefixRole {
    Parent,
    Root,
    Placeholder,
    Context,
}

impl PrefixRole {
    fn label(self) -> &'static str {
        match self {
            PrefixRole::Parent => "parent",
            PrefixRole::Root => "root",
            PrefixRole::Placeholder => "placeholder",
            PrefixRole::Context => "context",
        }
    }
}

/// A separator role (spec.md §3.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeparatorRole {
    Property,
    Collection,
    Each,
}

impl SeparatorRole {
    fn label(self) -> &'static str {
        match self {
            SeparatorRole::Property => "property separator",
            SeparatorRole::Collection => "collection separator",
            SeparatorRole::Each => "each separator",
        }
    }
}

/// A container role (spec.md §3.2), each bound to an opener/closer pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerRole {
    Property,
    SingleQuote,
    DoubleQuote,
    Call,
    EvalProperty,
}

impl ContainerRole {
    fn label(self) -> &'static str {
        match self {
            ContainerRole::Property => "property container",
            ContainerRole::SingleQuote => "singlequote container",
            ContainerRole::DoubleQuote => "doublequote container",
            ContainerRole::Call => "call container",
            ContainerRole::EvalProperty => "evalProperty container",
        }
    }
}

const WILDCARD: char = '*';

/// Derived, immutable snapshot rebuilt on every syntax mutation.
///
/// Held behind an `Rc` so a caller who captured one via
/// [`SyntaxTable::bundle`] keeps a valid view of the syntax that was in
/// effect at the time, even after a later mutation swaps in a new bundle
/// (spec.md §8: "any prior `tokens(p)` reference remains valid").
pub struct SyntaxBundle {
    /// Every currently-special character (escapable, including closers).
    pub specials: HashSet<char>,
    /// `specials` minus the property separator — "complex-path" chars.
    pub complex: HashSet<char>,
    /// Matches any character in `complex`; used for the tokenizer's fast
    /// exit (spec.md §4.2 step 2).
    pub complex_regex: Regex,
}

/// Role→character bindings plus simple-mode toggle (spec.md §3.2, §4.1).
pub struct SyntaxTable {
    parent: char,
    root: char,
    placeholder: char,
    context: char,
    property_sep: char,
    collection_sep: char,
    each_sep: char,
    property: (char, char),
    singlequote: (char, char),
    doublequote: (char, char),
    call: (char, char),
    eval_property: (char, char),
    simple_mode: bool,
    bundle: Rc<SyntaxBundle>,
}

impl SyntaxTable {
    pub fn new_default() -> Self {
        let mut t = SyntaxTable {
            parent: '^',
            root: '~',
            placeholder: '%',
            context: '@',
            property_sep: '.',
            collection_sep: ',',
            each_sep: '<',
            property: ('[', ']'),
            singlequote: ('\'', '\''),
            doublequote: ('"', '"'),
            call: ('(', ')'),
            eval_property: ('{', '}'),
            simple_mode: false,
            bundle: Rc::new(SyntaxBundle {
                specials: HashSet::new(),
                complex: HashSet::new(),
                complex_regex: Regex::new(r"$^").expect("empty-match regex is valid"),
            }),
        };
        t.rebuild();
        t
    }

    pub fn property_sep(&self) -> char {
        self.property_sep
    }

    pub fn collection_sep(&self) -> char {
        self.collection_sep
    }

    pub fn each_sep(&self) -> char {
        self.each_sep
    }

    pub fn simple_mode(&self) -> bool {
        self.simple_mode
    }

    pub fn set_simple_mode(&mut self, enabled: bool) {
        self.simple_mode = enabled;
    }

    pub fn get_prefix(&self, role: PrefixRole) -> char {
        match role {
            PrefixRole::Parent => self.parent,
            PrefixRole::Root => self.root,
            PrefixRole::Placeholder => self.placeholder,
            PrefixRole::Context => self.context,
        }
    }

    pub fn set_prefix(&mut self, role: PrefixRole, ch: char) -> Result<(), ConfigError> {
        self.validate(ch, role.label(), &[Slot::Prefix(role)])?;
        match role {
            PrefixRole::Parent => self.parent = ch,
            PrefixRole::Root => self.root = ch,
            PrefixRole::Placeholder => self.placeholder = ch,
            PrefixRole::Context => self.context = ch,
        }
        self.rebuild();
        Ok(())
    }

    pub fn get_separator(&self, role: SeparatorRole) -> char {
        match role {
            SeparatorRole::Property => self.property_sep,
            SeparatorRole::Collection => self.collection_sep,
            SeparatorRole::Each => self.each_sep,
        }
    }

    pub fn set_separator(&mut self, role: SeparatorRole, ch: char) -> Result<(), ConfigError> {
        self.validate(ch, role.label(), &[Slot::Separator(role)])?;
        match role {
            SeparatorRole::Property => self.property_sep = ch,
            SeparatorRole::Collection => self.collection_sep = ch,
            SeparatorRole::Each => self.each_sep = ch,
        }
        self.rebuild();
        Ok(())
    }

    pub fn get_container(&self, role: ContainerRole) -> (char, char) {
        match role {
            ContainerRole::Property => self.property,
            ContainerRole::SingleQuote => self.singlequote,
            ContainerRole::DoubleQuote => self.doublequote,
            ContainerRole::Call => self.call,
            ContainerRole::EvalProperty => self.eval_property,
        }
    }

    pub fn set_container(
        &mut self,
        role: ContainerRole,
        open: char,
        close: char,
    ) -> Result<(), ConfigError> {
        self.validate(open, role.label(), &[Slot::Container(role)])?;
        if close != open {
            self.validate(close, role.label(), &[Slot::Container(role)])?;
        }
        match role {
            ContainerRole::Property => self.property = (open, close),
            ContainerRole::SingleQuote => self.singlequote = (open, close),
            ContainerRole::DoubleQuote => self.doublequote = (open, close),
            ContainerRole::Call => self.call = (open, close),
            ContainerRole::EvalProperty => self.eval_property = (open, close),
        }
        self.rebuild();
        Ok(())
    }

    /// Atomically replaces all four prefix characters. Validates the
    /// complete incoming mapping (including collisions between the new
    /// prefixes themselves) before committing any of it, which is what
    /// lets two already-bound prefixes swap roles (e.g. `parent`↔`root`)
    /// in one call — doing it one [`SyntaxTable::set_prefix`] at a time
    /// would have the first call rejected against the other role's
    /// still-current character.
    pub fn set_prefix_group(
        &mut self,
        parent: char,
        root: char,
        placeholder: char,
        context: char,
    ) -> Result<(), ConfigError> {
        let entries = [
            (Slot::Prefix(PrefixRole::Parent), parent, PrefixRole::Parent.label()),
            (Slot::Prefix(PrefixRole::Root), root, PrefixRole::Root.label()),
            (
                Slot::Prefix(PrefixRole::Placeholder),
                placeholder,
                PrefixRole::Placeholder.label(),
            ),
            (Slot::Prefix(PrefixRole::Context), context, PrefixRole::Context.label()),
        ];
        self.validate_group(&entries)?;
        self.parent = parent;
        self.root = root;
        self.placeholder = placeholder;
        self.context = context;
        self.rebuild();
        Ok(())
    }

    /// Atomically replaces all three separator characters. See
    /// [`SyntaxTable::set_prefix_group`] for why this needs to validate
    /// as one mapping rather than three independent calls.
    pub fn set_separator_group(
        &mut self,
        property: char,
        collection: char,
        each: char,
    ) -> Result<(), ConfigError> {
        let entries = [
            (
                Slot::Separator(SeparatorRole::Property),
                property,
                SeparatorRole::Property.label(),
            ),
            (
                Slot::Separator(SeparatorRole::Collection),
                collection,
                SeparatorRole::Collection.label(),
            ),
            (Slot::Separator(SeparatorRole::Each), each, SeparatorRole::Each.label()),
        ];
        self.validate_group(&entries)?;
        self.property_sep = property;
        self.collection_sep = collection;
        self.each_sep = each;
        self.rebuild();
        Ok(())
    }

    /// Atomically replaces all five container opener/closer pairs. See
    /// [`SyntaxTable::set_prefix_group`] for why this needs to validate
    /// as one mapping rather than five independent calls.
    pub fn set_container_group(
        &mut self,
        property: (char, char),
        singlequote: (char, char),
        doublequote: (char, char),
        call: (char, char),
        eval_property: (char, char),
    ) -> Result<(), ConfigError> {
        let pairs = [
            (ContainerRole::Property, property),
            (ContainerRole::SingleQuote, singlequote),
            (ContainerRole::DoubleQuote, doublequote),
            (ContainerRole::Call, call),
            (ContainerRole::EvalProperty, eval_property),
        ];
        let slots: Vec<Slot> = pairs.iter().map(|&(role, _)| Slot::Container(role)).collect();
        let mut entries: Vec<(char, &'static str)> = Vec::new();
        for &(role, (open, close)) in &pairs {
            let label = role.label();
            entries.push((open, label));
            if close != open {
                entries.push((close, label));
            }
        }
        self.validate_distinct(&entries, &slots)?;
        self.property = property;
        self.singlequote = singlequote;
        self.doublequote = doublequote;
        self.call = call;
        self.eval_property = eval_property;
        self.rebuild();
        Ok(())
    }

    pub fn reset_defaults(&mut self) {
        *self = SyntaxTable::new_default();
    }

    pub fn bundle(&self) -> &Rc<SyntaxBundle> {
        &self.bundle
    }

    /// Every currently-bound character, tagged with the role holding it,
    /// excluding any slot in `except` (the slots about to be overwritten,
    /// which are allowed to keep their own characters for the duration of
    /// the validation that replaces them).
    fn bound_chars(&self, except: &[Slot]) -> Vec<(char, &'static str)> {
        let mut v = Vec::new();
        let mut push = |slot: Slot, ch: char, label: &'static str| {
            if !except.contains(&slot) {
                v.push((ch, label));
            }
        };
        push(Slot::Prefix(PrefixRole::Parent), self.parent, "parent");
        push(Slot::Prefix(PrefixRole::Root), self.root, "root");
        push(
            Slot::Prefix(PrefixRole::Placeholder),
            self.placeholder,
            "placeholder",
        );
        push(Slot::Prefix(PrefixRole::Context), self.context, "context");
        push(
            Slot::Separator(SeparatorRole::Property),
            self.property_sep,
            "property separator",
        );
        push(
            Slot::Separator(SeparatorRole::Collection),
            self.collection_sep,
            "collection separator",
        );
        push(
            Slot::Separator(SeparatorRole::Each),
            self.each_sep,
            "each separator",
        );
        for (slot, (o, c), label) in [
            (
                Slot::Container(ContainerRole::Property),
                self.property,
                "property container",
            ),
            (
                Slot::Container(ContainerRole::SingleQuote),
                self.singlequote,
                "singlequote container",
            ),
            (
                Slot::Container(ContainerRole::DoubleQuote),
                self.doublequote,
                "doublequote container",
            ),
            (Slot::Container(ContainerRole::Call), self.call, "call container"),
            (
                Slot::Container(ContainerRole::EvalProperty),
                self.eval_property,
                "evalProperty container",
            ),
        ] {
            if !except.contains(&slot) {
                v.push((o, label));
                if c != o {
                    v.push((c, label));
                }
            }
        }
        v
    }

    fn validate(&self, ch: char, label: &'static str, except: &[Slot]) -> Result<(), ConfigError> {
        if ch == WILDCARD {
            return Err(ConfigError::WildcardReserved(label));
        }
        if ch.is_control() {
            return Err(ConfigError::NotPrintable(ch, label));
        }
        if let Some((_, other_label)) = self
            .bound_chars(except)
            .into_iter()
            .find(|&(bound, _)| bound == ch)
        {
            return Err(ConfigError::CharacterInUse(ch, other_label));
        }
        Ok(())
    }

    /// Validates a complete group of incoming (slot, char, label)
    /// assignments as one atomic unit: every character must be free of
    /// collisions both against the *other*, not-being-replaced roles and
    /// against its *own* group siblings (two roles in the same group
    /// cannot end up bound to the same character either).
    fn validate_group(&self, entries: &[(Slot, char, &'static str)]) -> Result<(), ConfigError> {
        let slots: Vec<Slot> = entries.iter().map(|&(slot, _, _)| slot).collect();
        for (i, &(_, ch, label)) in entries.iter().enumerate() {
            if let Some(&(_, _, other_label)) = entries[..i].iter().find(|&&(_, other_ch, _)| other_ch == ch) {
                return Err(ConfigError::CharacterInUse(ch, other_label));
            }
            self.validate(ch, label, &slots)?;
        }
        Ok(())
    }

    /// Like [`SyntaxTable::validate_group`], but for container pairs where
    /// an opener/closer pair can legitimately share the group's own
    /// character (e.g. a quote's `open == close`) — `entries` is the
    /// already-flattened, deduplicated-per-pair list of new characters.
    fn validate_distinct(&self, entries: &[(char, &'static str)], slots: &[Slot]) -> Result<(), ConfigError> {
        for (i, &(ch, label)) in entries.iter().enumerate() {
            if let Some(&(_, other_label)) = entries[..i].iter().find(|&&(other_ch, other_label)| {
                other_ch == ch && other_label != label
            }) {
                return Err(ConfigError::CharacterInUse(ch, other_label));
            }
            self.validate(ch, label, slots)?;
        }
        Ok(())
    }

    fn rebuild(&mut self) {
        let mut specials: HashSet<char> = HashSet::new();
        specials.insert('\\');
        for (ch, _) in self.bound_chars(&[]) {
            specials.insert(ch);
        }
        let mut complex = specials.clone();
        complex.remove(&self.property_sep);

        let pattern = if complex.is_empty() {
            r"$^".to_owned()
        } else {
            let alternation: Vec<String> = complex.iter().map(|c| regex::escape(&c.to_string())).collect();
            alternation.join("|")
        };
        let complex_regex = Regex::new(&pattern).expect("derived alternation regex is always valid");

        self.bundle = Rc::new(SyntaxBundle {
            specials,
            complex,
            complex_regex,
        });
    }
}

impl Default for SyntaxTable {
    fn default() -> Self {
        SyntaxTable::new_default()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Prefix(PrefixRole),
    Separator(SeparatorRole),
    Container(ContainerRole),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_no_collisions() {
        let t = SyntaxTable::new_default();
        assert!(t.bundle().specials.contains(&'^'));
        assert!(!t.bundle().complex.contains(&'.'));
    }

    #[test]
    fn rejects_wildcard_assignment() {
        let mut t = SyntaxTable::new_default();
        assert_eq!(
            t.set_prefix(PrefixRole::Parent, '*'),
            Err(ConfigError::WildcardReserved("parent"))
        );
    }

    #[test]
    fn rejects_character_already_in_use() {
        let mut t = SyntaxTable::new_default();
        let err = t.set_prefix(PrefixRole::Parent, '~').unwrap_err();
        assert_eq!(err, ConfigError::CharacterInUse('~', "root"));
    }

    #[test]
    fn reassigning_a_role_to_its_own_character_is_allowed() {
        let mut t = SyntaxTable::new_default();
        assert!(t.set_prefix(PrefixRole::Parent, '^').is_ok());
    }

    #[test]
    fn prefix_group_can_swap_two_already_bound_characters() {
        let mut t = SyntaxTable::new_default();
        assert_eq!(t.get_prefix(PrefixRole::Parent), '^');
        assert_eq!(t.get_prefix(PrefixRole::Root), '~');

        // One setter at a time would reject the first call: '~' is still
        // bound to Root when the Parent call runs.
        assert!(t.set_prefix(PrefixRole::Parent, '~').is_err());

        t.set_prefix_group('~', '^', '%', '@').unwrap();
        assert_eq!(t.get_prefix(PrefixRole::Parent), '~');
        assert_eq!(t.get_prefix(PrefixRole::Root), '^');
    }

    #[test]
    fn prefix_group_rejects_intra_group_collisions_without_mutating() {
        let mut t = SyntaxTable::new_default();
        let err = t.set_prefix_group('#', '#', '%', '@').unwrap_err();
        assert_eq!(err, ConfigError::CharacterInUse('#', "parent"));
        assert_eq!(t.get_prefix(PrefixRole::Parent), '^');
        assert_eq!(t.get_prefix(PrefixRole::Root), '~');
    }

    #[test]
    fn container_group_replaces_all_five_pairs_atomically() {
        let mut t = SyntaxTable::new_default();
        t.set_container_group(
            (']', '['),
            ('\'', '\''),
            ('"', '"'),
            ('(', ')'),
            ('{', '}'),
        )
        .unwrap();
        assert_eq!(t.get_container(ContainerRole::Property), (']', '['));
    }

    #[test]
    fn mutation_rebuilds_the_bundle() {
        let mut t = SyntaxTable::new_default();
        let before = Rc::clone(t.bundle());
        t.set_prefix(PrefixRole::Parent, '#').unwrap();
        assert!(!Rc::ptr_eq(&before, t.bundle()));
        assert!(before.specials.contains(&'^'));
        assert!(t.bundle().specials.contains(&'#'));
    }
}
