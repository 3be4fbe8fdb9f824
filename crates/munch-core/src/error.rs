use thiserror::Error;

/// Construction-time failures. Lexical errors never appear here: they are
/// reported as error tokens in the scanned stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A code point outside the 16-bit alphabet was passed to a charset
    /// constructor.
    #[error("char code {0:#x} is outside the [0x0, 0xffff] alphabet")]
    InvalidCharCode(u32),
    /// The pattern of a token type accepts the empty string.
    #[error("pattern for token type `{0}` matches the empty string")]
    OptionalTokenPattern(String),
    /// A pattern string could not be parsed.
    #[error("invalid pattern at offset {offset}: {message}")]
    Pattern { offset: usize, message: String },
    /// A grammar lookup was performed for a symbol the grammar does not
    /// define.
    #[error("unknown symbol {0}")]
    UnknownSymbol(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
