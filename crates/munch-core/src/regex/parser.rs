//! Recursive-descent parser for pattern strings.

use crate::charset::{CharSet, MAX_CODE};
use crate::error::{Error, Result};

use super::RegEx;

/// Pattern flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct Flags {
    case_insensitive: bool,
}

impl Flags {
    pub fn set_case_insensitive(mut self, insensitive: bool) -> Self {
        self.case_insensitive = insensitive;
        self
    }
}

/// Pattern compilation configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct Config {
    flags: Flags,
}

impl Config {
    pub fn set_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }
}

///   <pattern> ::= <term> '|' <pattern>
///              |  <term>
///
///   <term> ::= { <factor> }
///
///   <factor> ::= <base> [ '*' | '+' | '?' ]
///
///   <base> ::= <unit>
///           |  '.'
///           |  '\' <unit>
///           |  '(' <pattern> ')'
///           |  '[' [ '^' ] { <unit> [ '-' <unit> ] } ']'
pub(super) fn parse(pattern: &str, config: Config) -> Result<RegEx> {
    let units: Vec<u16> = pattern.encode_utf16().collect();
    let mut p = Parser { units, at: 0, config };
    let re = p.pattern()?;
    match p.peek() {
        None => Ok(re),
        Some(_) => Err(p.error("trailing input")),
    }
}

struct Parser {
    units: Vec<u16>,
    at: usize,
    config: Config,
}

impl Parser {
    fn peek(&self) -> Option<u16> {
        self.units.get(self.at).copied()
    }

    fn bump(&mut self) -> Option<u16> {
        let unit = self.peek()?;
        self.at += 1;
        Some(unit)
    }

    fn eat(&mut self, unit: char) -> bool {
        if self.peek() == Some(unit as u16) {
            self.at += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::Pattern {
            offset: self.at,
            message: message.into(),
        }
    }

    fn pattern(&mut self) -> Result<RegEx> {
        let lhs = self.term()?;
        if self.eat('|') {
            let rhs = self.pattern()?;
            Ok(lhs.or(&rhs))
        } else {
            Ok(lhs)
        }
    }

    fn term(&mut self) -> Result<RegEx> {
        let mut factors = Vec::new();
        while let Some(f) = self.factor()? {
            factors.push(f);
        }
        match factors.len() {
            0 => Err(self.error("empty pattern")),
            1 => Ok(factors.pop().unwrap_or_else(|| unreachable!())),
            _ => Ok(RegEx::concat(&factors.iter().collect::<Vec<_>>())),
        }
    }

    fn factor(&mut self) -> Result<Option<RegEx>> {
        let Some(base) = self.base()? else {
            return Ok(None);
        };
        let out = if self.eat('*') {
            base.repeated().optional()
        } else if self.eat('+') {
            base.repeated()
        } else if self.eat('?') {
            base.optional()
        } else {
            base
        };
        Ok(Some(out))
    }

    fn base(&mut self) -> Result<Option<RegEx>> {
        let Some(unit) = self.peek() else {
            return Ok(None);
        };
        if unit == '|' as u16 || unit == ')' as u16 {
            return Ok(None);
        }
        if unit == '*' as u16 || unit == '+' as u16 || unit == '?' as u16 {
            return Err(self.error("dangling repetition operator"));
        }
        if self.eat('(') {
            let inner = self.pattern()?;
            if !self.eat(')') {
                return Err(self.error("unclosed group"));
            }
            return Ok(Some(inner));
        }
        if self.eat('[') {
            let set = self.class()?;
            return Ok(Some(RegEx::from_set(set)));
        }
        if self.eat('.') {
            return Ok(Some(RegEx::any_char()));
        }
        let c = self.unit()?;
        Ok(Some(RegEx::from_set(self.fold(singleton(c)))))
    }

    /// Character class body, after the opening bracket.
    fn class(&mut self) -> Result<CharSet> {
        let negate = self.eat('^');
        let mut set = CharSet::empty();
        loop {
            match self.peek() {
                None => return Err(self.error("unclosed character class")),
                Some(u) if u == ']' as u16 => {
                    self.at += 1;
                    break;
                }
                Some(_) => {
                    let start = self.unit()?;
                    let dashed_range = self.peek() == Some('-' as u16)
                        && self.units.get(self.at + 1).copied() != Some(']' as u16);
                    if dashed_range {
                        self.at += 1;
                        let end = self.unit()?;
                        let range = CharSet::range(u32::from(start), u32::from(end))
                            .unwrap_or_else(|_| unreachable!());
                        set = set.union(&range);
                    } else {
                        set = set.union(&singleton(start));
                    }
                }
            }
        }
        set = self.fold(set);
        if negate {
            set = set.complement();
        }
        Ok(set)
    }

    /// Widens a set to both cases of its ASCII letters when the
    /// insensitivity flag is on. Negation applies after folding.
    fn fold(&self, set: CharSet) -> CharSet {
        if !self.config.flags.case_insensitive {
            return set;
        }
        let case_span = i64::from('a' as u32 - 'A' as u32);
        let lowers = set.intersect(&ascii_range('a', 'z'));
        let uppers = set.intersect(&ascii_range('A', 'Z'));
        set.union(&shift(&lowers, -case_span))
            .union(&shift(&uppers, case_span))
    }

    /// One literal code unit, honoring escapes.
    fn unit(&mut self) -> Result<u16> {
        match self.bump() {
            None => Err(self.error("unexpected end of pattern")),
            Some(u) if u == '\\' as u16 => {
                self.bump().ok_or_else(|| self.error("dangling escape"))
            }
            Some(u) => Ok(u),
        }
    }
}

fn singleton(c: u16) -> CharSet {
    debug_assert!(u32::from(c) <= MAX_CODE);
    CharSet::char(u32::from(c)).unwrap_or_else(|_| unreachable!())
}

fn ascii_range(a: char, b: char) -> CharSet {
    CharSet::range(a as u32, b as u32).unwrap_or_else(|_| unreachable!())
}

fn shift(set: &CharSet, delta: i64) -> CharSet {
    CharSet::from_ranges(set.ranges().iter().map(|r| {
        crate::charset::CharRange::new(
            (i64::from(r.min()) + delta) as u32,
            (i64::from(r.max()) + delta) as u32,
        )
    }))
}
