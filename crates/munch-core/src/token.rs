//! Token types bind a pattern to a value parser and a display name;
//! tokens are what the scanner emits.

use std::fmt;

use rand::Rng;

use crate::error::{Error, Result};
use crate::regex::RegEx;
use crate::stream::Position;

/// Index of a token type within its scanner, in declaration order. The
/// declaration order doubles as the precedence used for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenTypeId(pub(crate) usize);

impl TokenTypeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

type ParseFn<V> = Box<dyn Fn(&str) -> V>;
type StringifyFn<V> = Box<dyn Fn(&V) -> String>;

/// A kind of token: a non-optional pattern, a lexeme-to-value parser, a
/// value-to-lexeme stringifier and a human-readable name.
pub struct TokenType<V> {
    name: String,
    pattern: RegEx,
    parse: Option<ParseFn<V>>,
    stringify: Option<StringifyFn<V>>,
}

impl<V> fmt::Debug for TokenType<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenType").field("name", &self.name).finish()
    }
}

impl<V> TokenType<V> {
    /// Builds a token type. Fails when `pattern` accepts the empty
    /// string: such a type would let the scanner emit empty lexemes and
    /// lose forward progress.
    pub fn new(
        name: impl Into<String>,
        pattern: RegEx,
        parse: impl Fn(&str) -> V + 'static,
        stringify: impl Fn(&V) -> String + 'static,
    ) -> Result<Self> {
        let name = name.into();
        if pattern.is_optional() {
            return Err(Error::OptionalTokenPattern(name));
        }
        Ok(Self {
            name,
            pattern,
            parse: Some(Box::new(parse)),
            stringify: Some(Box::new(stringify)),
        })
    }

    /// The two scanner-owned types (error, end of stream) have no user
    /// parser; their tokens carry no value.
    pub(crate) fn implicit(name: &str, pattern: RegEx) -> Self {
        debug_assert!(!pattern.is_optional());
        Self {
            name: name.into(),
            pattern,
            parse: None,
            stringify: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RegEx {
        &self.pattern
    }

    /// Runs the value parser, or `None` for the implicit types.
    pub fn parse(&self, lexeme: &str) -> Option<V> {
        self.parse.as_ref().map(|f| f(lexeme))
    }

    /// Renders a value back to a lexeme, or `None` for the implicit
    /// types.
    pub fn stringify(&self, value: &V) -> Option<String> {
        self.stringify.as_ref().map(|f| f(value))
    }

    /// A random lexeme matched by this type's pattern.
    pub fn random_lexeme<R: Rng>(&self, rng: &mut R) -> String {
        self.pattern.random_string(rng)
    }
}

/// One scanned lexeme, tagged with its token type and the position where
/// it began.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<V> {
    pub(crate) type_id: TokenTypeId,
    pub(crate) lexeme: String,
    pub(crate) position: Position,
    pub(crate) value: Option<V>,
}

impl<V> Token<V> {
    pub fn type_id(&self) -> TokenTypeId {
        self.type_id
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<V> {
        self.value
    }
}
