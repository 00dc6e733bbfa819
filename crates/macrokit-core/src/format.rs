//! Persisted macro document format.
//!
//! One JSON document per macro, pretty-printed so users can edit it by
//! hand. Loading is tolerant in both directions: unknown fields are
//! ignored, and missing optional fields take the defaults defined on the
//! domain types. A document written by a newer or older build, or edited
//! by a user, never fails to load over an absent optional field.

use thiserror::Error;

use crate::domain::macros::Macro;

/// Error type for document (de)serialization.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The document is not valid JSON or violates the schema's types.
    #[error("malformed macro document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serializes a macro to its on-disk JSON document.
///
/// # Errors
///
/// Returns [`FormatError::Malformed`] only on serializer failure, which for
/// this schema means an internal bug rather than bad input.
pub fn macro_to_document(macro_def: &Macro) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(macro_def)?)
}

/// Deserializes a macro from a JSON document.
///
/// # Errors
///
/// Returns [`FormatError::Malformed`] if the text is not valid JSON or a
/// present field has the wrong type. Absent optional fields do not error.
pub fn macro_from_document(document: &str) -> Result<Macro, FormatError> {
    Ok(serde_json::from_str(document)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
