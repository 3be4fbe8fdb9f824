//! Regular expressions as a thin façade over the automaton engine. The
//! tag type is pinned to the [`Accept`] marker; everything else (token
//! tagging, tie-breaking) belongs to the scanner layer.

use std::cell::OnceCell;

use rand::Rng;

use crate::automaton::{Automaton, Matcher, State};
use crate::charset::CharSet;
use crate::error::Result;

mod parser;

pub use parser::{Config, Flags};

/// The single tag regular-expression automata carry on accept states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accept;

/// A composable regular expression over 16-bit code units.
///
/// Construction never mutates inputs; every combinator yields a fresh
/// expression. The deterministic automaton used for matching is built on
/// first use and cached for the expression's lifetime.
#[derive(Debug, Clone)]
pub struct RegEx {
    autom: Automaton<Accept>,
    dfa: OnceCell<Automaton<Accept>>,
}

impl RegEx {
    fn new(autom: Automaton<Accept>) -> Self {
        Self {
            autom,
            dfa: OnceCell::new(),
        }
    }

    /// Matches exactly one code unit from `set`.
    pub fn from_set(set: CharSet) -> Self {
        let mut b = Automaton::builder();
        let start = b.push(State::transient());
        let accept = b.push(State::accepting([Accept]));
        b.state_mut(start).on(set, accept, false);
        Self::new(b.build())
    }

    /// Matches one code unit equal to `c`.
    pub fn char(c: u32) -> Result<Self> {
        Ok(Self::from_set(CharSet::char(c)?))
    }

    /// Matches one code unit inside the given bounds.
    pub fn range(a: u32, b: u32) -> Result<Self> {
        Ok(Self::from_set(CharSet::range(a, b)?))
    }

    /// Matches any single code unit.
    pub fn any_char() -> Self {
        Self::from_set(CharSet::all())
    }

    /// Matches the given string, unit for unit.
    pub fn literal(s: &str) -> Self {
        let mut b = Automaton::builder();
        let mut prev = b.push(State::transient());
        for unit in s.encode_utf16() {
            let next = b.push(State::transient());
            let set = CharSet::char(u32::from(unit)).unwrap_or_else(|_| unreachable!());
            b.state_mut(prev).on(set, next, false);
            prev = next;
        }
        b.state_mut(prev).add_recognizable(Accept);
        Self::new(b.build())
    }

    /// Compiles a pattern string: alternation, grouping, classes,
    /// escapes and the `*` `+` `?` postfix operators.
    pub fn parse(pattern: &str) -> Result<Self> {
        Self::parse_with(pattern, Config::default())
    }

    /// Compiles a pattern string under the given configuration.
    pub fn parse_with(pattern: &str, config: Config) -> Result<Self> {
        parser::parse(pattern, config)
    }

    /// Compiles a pattern string with ASCII-case-insensitive letters.
    pub fn parse_insensitive(pattern: &str) -> Result<Self> {
        Self::parse_with(
            pattern,
            Config::default().set_flags(Flags::default().set_case_insensitive(true)),
        )
    }

    /// This expression or `other`.
    pub fn or(&self, other: &Self) -> Self {
        Self::choice(&[self, other])
    }

    /// This expression followed by `other`.
    pub fn then(&self, other: &Self) -> Self {
        Self::concat(&[self, other])
    }

    /// Any of the operands.
    pub fn choice(operands: &[&Self]) -> Self {
        let autos: Vec<&Automaton<Accept>> = operands.iter().map(|r| &r.autom).collect();
        Self::new(Automaton::choice(&autos))
    }

    /// All operands in sequence.
    pub fn concat(operands: &[&Self]) -> Self {
        let autos: Vec<&Automaton<Accept>> = operands.iter().map(|r| &r.autom).collect();
        Self::new(Automaton::concat(&autos))
    }

    /// Zero or one occurrence.
    pub fn optional(&self) -> Self {
        Self::new(self.autom.optional())
    }

    /// One or more occurrences.
    pub fn repeated(&self) -> Self {
        Self::new(self.autom.repeated())
    }

    /// Whether the empty string is accepted.
    pub fn is_optional(&self) -> bool {
        self.autom.is_optional()
    }

    /// The underlying automaton, as composed.
    pub fn automaton(&self) -> &Automaton<Accept> {
        &self.autom
    }

    /// The deterministic automaton, built on first use.
    pub fn deterministic(&self) -> &Automaton<Accept> {
        self.dfa.get_or_init(|| self.autom.deterministic())
    }

    /// Whether the whole input is accepted.
    pub fn matches(&self, input: &str) -> bool {
        let mut m = Matcher::new(self.deterministic());
        for unit in input.encode_utf16() {
            if !m.step(unit) {
                return false;
            }
        }
        m.is_recognizing()
    }

    /// Finds the first match in `input`: the longest accepted fragment at
    /// the earliest position where one exists. Returns the fragment and
    /// its code-unit offset.
    pub fn find(&self, input: &str) -> Option<(usize, String)> {
        let units: Vec<u16> = input.encode_utf16().collect();
        let dfa = self.deterministic();
        for start in 0..=units.len() {
            let mut m = Matcher::new(dfa);
            let mut best = m.is_recognizing().then_some(0usize);
            for (len, &unit) in units[start..].iter().enumerate() {
                if !m.step(unit) {
                    break;
                }
                if m.is_recognizing() {
                    best = Some(len + 1);
                }
            }
            if let Some(len) = best {
                return Some((start, String::from_utf16_lossy(&units[start..start + len])));
            }
        }
        None
    }

    /// Generates a random accepted string by walking the deterministic
    /// automaton. The probability of extending past an accept state
    /// decays with the length walked so far, which keeps cyclic
    /// expressions from growing without bound.
    pub fn random_string<R: Rng>(&self, rng: &mut R) -> String {
        let dfa = self.deterministic();
        if dfa.final_states().next().is_none() {
            return String::new();
        }
        let mut units: Vec<u16> = Vec::new();
        let mut m = Matcher::new(dfa);
        let mut keep_going = 0.7f64;
        loop {
            if m.is_recognizing() && !rng.gen_bool(keep_going) {
                break;
            }
            match m.random_step(rng) {
                Some(c) => units.push(c),
                None => {
                    if m.is_recognizing() {
                        break;
                    }
                    // dead end before any accept: start the walk over
                    m.reset();
                    units.clear();
                }
            }
            keep_going *= 0.9;
        }
        String::from_utf16_lossy(&units)
    }
}
