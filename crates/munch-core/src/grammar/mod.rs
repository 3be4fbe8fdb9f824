//! A small grammar layer on top of the scanner: flat rules over dense
//! symbols, first/follow derivation and random sentence generation.
//! Terminal symbols can be bound to token types so generated sentences
//! can be rendered through their patterns.

use std::cell::OnceCell;
use std::fmt;
use std::ops::{Deref, DerefMut};

use hashbrown::HashMap;

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::token::TokenTypeId;

mod first_sets;
mod follow_sets;
mod gen;

pub use first_sets::FirstSets;
pub use follow_sets::FollowSets;

/// A grammar symbol. Ids 0 and 1 are reserved for epsilon and the end
/// marker; everything else is handed out by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    pub const fn epsilon() -> Self {
        Self(0)
    }

    pub const fn is_epsilon(&self) -> bool {
        self.0 == 0
    }

    pub const fn eof() -> Self {
        Self(1)
    }

    pub const fn is_eof(&self) -> bool {
        self.0 == 1
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// A set of symbols over a [`BitSet`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    inner: BitSet,
}

impl fmt::Debug for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, s: Symbol) {
        self.inner.insert(s.0);
    }

    pub fn contains(&self, s: Symbol) -> bool {
        self.inner.contains(s.0)
    }

    pub fn add_epsilon(&mut self) {
        self.add(Symbol::epsilon());
    }

    pub fn remove_epsilon(&mut self) {
        self.inner.remove(Symbol::epsilon().0);
    }

    pub fn contains_epsilon(&self) -> bool {
        self.contains(Symbol::epsilon())
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.inner.iter().map(Symbol)
    }

    /// Adds every symbol of `other`; reports whether anything changed.
    pub fn absorb(&mut self, other: &Self) -> bool {
        self.inner.absorb(&other.inner)
    }
}

impl Deref for SymbolSet {
    type Target = BitSet;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SymbolSet {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(it: I) -> Self {
        let mut out = Self::new();
        for s in it {
            out.add(s);
        }
        out
    }
}

/// A flat production. An empty alternative is written with an epsilon
/// right-hand side.
#[derive(Debug, Clone)]
pub struct Rule {
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

impl Rule {
    pub fn lhs(&self) -> Symbol {
        self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }
}

pub struct Builder {
    next: u32,
    rules: Vec<Rule>,
    bindings: HashMap<Symbol, TokenTypeId>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            next: Symbol::eof().as_u32(),
            rules: Vec::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn epsilon(&self) -> Symbol {
        Symbol::epsilon()
    }

    pub fn eof(&self) -> Symbol {
        Symbol::eof()
    }

    /// Allocates a fresh symbol.
    pub fn symbol(&mut self) -> Symbol {
        self.next += 1;
        Symbol(self.next)
    }

    /// Allocates as many symbols as the destructuring pattern asks for.
    pub fn symbols<const N: usize>(&mut self) -> [Symbol; N] {
        std::array::from_fn(|_| self.symbol())
    }

    /// Allocates a terminal bound to a token type.
    pub fn terminal(&mut self, token_type: TokenTypeId) -> Symbol {
        let s = self.symbol();
        self.bindings.insert(s, token_type);
        s
    }

    /// Starts declaring alternatives for `lhs`.
    pub fn rule(&mut self, lhs: Symbol) -> RuleBuilder<'_> {
        RuleBuilder { builder: self, lhs }
    }

    pub fn build(self, goal: Symbol) -> Grammar {
        let mut symbols = SymbolSet::new();
        symbols.add(Symbol::epsilon());
        symbols.add(Symbol::eof());
        for id in Symbol::eof().as_u32() + 1..=self.next {
            symbols.add(Symbol(id));
        }

        let mut non_terminals = SymbolSet::new();
        for r in &self.rules {
            non_terminals.add(r.lhs);
        }
        let terminals: SymbolSet = symbols
            .iter()
            .filter(|s| !s.is_epsilon() && !non_terminals.contains(*s))
            .collect();

        Grammar {
            goal,
            rules: self.rules,
            symbols,
            terminals,
            non_terminals,
            bindings: self.bindings,
            first_sets: OnceCell::new(),
            follow_sets: OnceCell::new(),
        }
    }
}

pub struct RuleBuilder<'a> {
    builder: &'a mut Builder,
    lhs: Symbol,
}

impl RuleBuilder<'_> {
    /// Adds one alternative for the rule's left-hand side.
    pub fn is(self, rhs: impl IntoIterator<Item = Symbol>) -> Self {
        let rhs: Vec<Symbol> = rhs.into_iter().collect();
        assert!(!rhs.is_empty(), "an empty alternative is written [epsilon]");
        self.builder.rules.push(Rule { lhs: self.lhs, rhs });
        self
    }
}

pub struct Grammar {
    goal: Symbol,
    rules: Vec<Rule>,
    symbols: SymbolSet,
    terminals: SymbolSet,
    non_terminals: SymbolSet,
    bindings: HashMap<Symbol, TokenTypeId>,
    first_sets: OnceCell<FirstSets>,
    follow_sets: OnceCell<FollowSets>,
}

impl Grammar {
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub fn goal(&self) -> Symbol {
        self.goal
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The alternatives declared for `s`, with their indices.
    pub fn rules_for(&self, s: Symbol) -> impl Iterator<Item = (usize, &Rule)> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.lhs == s)
    }

    /// Every symbol of the grammar, epsilon and the end marker included.
    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Symbols never appearing as a left-hand side, the end marker
    /// included.
    pub fn terminals(&self) -> &SymbolSet {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &SymbolSet {
        &self.non_terminals
    }

    pub fn is_terminal(&self, s: Symbol) -> bool {
        self.terminals.contains(s)
    }

    pub fn is_non_terminal(&self, s: Symbol) -> bool {
        self.non_terminals.contains(s)
    }

    /// First sets of every symbol, computed on first use.
    pub fn first_sets(&self) -> &FirstSets {
        self.first_sets.get_or_init(|| FirstSets::compute(self))
    }

    /// Follow sets of every non-terminal, computed on first use.
    pub fn follow_sets(&self) -> &FollowSets {
        self.follow_sets.get_or_init(|| FollowSets::compute(self))
    }

    /// The first set of one symbol.
    pub fn first(&self, s: Symbol) -> Result<&SymbolSet> {
        self.first_sets()
            .get(s)
            .ok_or(Error::UnknownSymbol(s.as_u32()))
    }

    /// The token type a terminal renders as.
    pub fn token_type_of(&self, s: Symbol) -> Result<TokenTypeId> {
        self.bindings
            .get(&s)
            .copied()
            .ok_or(Error::UnknownSymbol(s.as_u32()))
    }
}
