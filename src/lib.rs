//! YAML reader and writer.
//!
//! `yamlet` converts YAML 1.2 text into an in-memory tagged value tree and
//! serializes such trees back to conforming YAML. It targets configuration
//! and data documents: cluster manifests, CI pipelines, service configs.
//!
//! # Parsing Pipeline
//!
//! The reader operates in three phases:
//!
//! 1. **Scanner**: Converts the byte stream into syntactic tokens,
//!    switching between YAML's indentation-sensitive block context and
//!    bracket-delimited flow context, and handling the five scalar styles.
//!
//! 2. **Parser**: Consumes the token stream with one token of lookahead,
//!    reconstructing block structure from token columns and resolving
//!    anchors, aliases, and tag overrides.
//!
//! 3. **Schema resolution**: Classifies each plain scalar into
//!    null/bool/int/float/string per the JSON schema.
//!
//! The writer renders block-style YAML with sorted mapping keys and
//! optional flow compaction; its output always re-parses to the same tree.
//!
//! # Example
//!
//! ```
//! use yamlet::{parse, Value};
//!
//! let value = parse("replicas: 3").unwrap();
//! let map = value.as_mapping().unwrap();
//! assert_eq!(map["replicas"], Value::Int(3));
//! ```

mod emitter;
mod error;
mod parser;
mod scanner;
mod schema;
mod value;

pub use emitter::{emit, emit_with, EmitOptions};
pub use error::{Error, Result};
pub use value::{Mapping, Value};

use std::fs;
use std::io::Write;
use std::path::Path;

/// Parse a YAML document from a string.
///
/// An empty input, `null`, or `~` all produce [`Value::Null`].
pub fn parse(input: &str) -> Result<Value> {
    let mut parser = parser::Parser::new(input);
    parser.parse_document()
}

/// Parse a YAML document from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

/// Serialize a value to a writer with default options.
pub fn emit_into<W: Write>(value: &Value, writer: &mut W) -> Result<()> {
    emit_into_with(value, writer, &EmitOptions::default())
}

/// Serialize a value to a writer with explicit options.
pub fn emit_into_with<W: Write>(
    value: &Value,
    writer: &mut W,
    options: &EmitOptions,
) -> Result<()> {
    writer.write_all(emit_with(value, options).as_bytes())?;
    Ok(())
}

/// Serialize a value to a file with default options.
pub fn emit_file<P: AsRef<Path>>(value: &Value, path: P) -> Result<()> {
    emit_file_with(value, path, &EmitOptions::default())
}

/// Serialize a value to a file with explicit options.
pub fn emit_file_with<P: AsRef<Path>>(
    value: &Value,
    path: P,
    options: &EmitOptions,
) -> Result<()> {
    fs::write(path, emit_with(value, options))?;
    Ok(())
}
