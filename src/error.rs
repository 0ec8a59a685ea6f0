//! Error types for YAML parsing and serialization.

use thiserror::Error;

/// Result type for YAML operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for YAML parsing and serialization.
///
/// Parser-level variants carry a location suffix (` at line:col`) built from
/// the failing token's mark; schema-level variants carry the offending
/// lexeme instead, since the resolver does not see positions.
#[derive(Error, Debug)]
pub enum Error {
    /// A token appeared where the grammar does not allow it.
    #[error("unexpected {0}{1}")]
    UnexpectedToken(String, String),

    /// The token stream ended inside an unfinished construct.
    #[error("unexpected end of stream{0}")]
    UnexpectedEndOfStream(String),

    /// An alias referred to an anchor that was never defined.
    #[error("unknown alias \"{0}\"{1}")]
    UnknownAlias(String, String),

    /// Structurally invalid document.
    #[error("invalid syntax: {0}{1}")]
    InvalidSyntax(String, String),

    /// A `!!bool`-tagged scalar whose lexeme is not a boolean.
    #[error("invalid boolean \"{0}\"")]
    InvalidBool(String),

    /// An `!!int`-tagged scalar whose lexeme is not an integer.
    #[error("invalid integer \"{0}\"")]
    InvalidInt(String),

    /// A `!!float`-tagged scalar whose lexeme is not a float.
    #[error("invalid float \"{0}\"")]
    InvalidFloat(String),

    /// A tag applied to a node that cannot carry it.
    #[error("invalid tag \"{0}\"{1}")]
    InvalidTag(String, String),

    /// An underlying reader or writer failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
