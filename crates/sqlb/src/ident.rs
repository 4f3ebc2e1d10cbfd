//! SQL identifier checks for table, column and alias names.
//!
//! Names are written verbatim into the rendered statement, so they are
//! validated once when they enter the builder:
//!
//! - must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - must not be empty
//!
//! This also guarantees a name never contains the `?` placeholder glyph,
//! which the numbered-placeholder pass relies on.

use crate::error::{SqlError, SqlResult};

/// Validate a plain (unquoted) identifier.
pub fn validate_ident(name: &str) -> SqlResult<()> {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return Err(SqlError::invalid_identifier(name, "identifier cannot be empty")),
    };
    if first != '_' && !first.is_ascii_alphabetic() {
        return Err(SqlError::invalid_identifier(
            name,
            format!("invalid identifier start character: '{first}'"),
        ));
    }
    for c in chars {
        if c != '_' && c != '$' && !c.is_ascii_alphanumeric() {
            return Err(SqlError::invalid_identifier(
                name,
                format!("invalid character in identifier: '{c}'"),
            ));
        }
    }
    Ok(())
}

/// Validate an optional alias.
pub(crate) fn validate_alias(alias: Option<&str>) -> SqlResult<()> {
    match alias {
        Some(a) => validate_ident(a),
        None => Ok(()),
    }
}
