//! Fatal error kinds for a retrieval call.
//!
//! An empty match set is not an error, and a rejected boundary truncation
//! is signalled by `None` from [`crate::truncate::truncate_chunk`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The corpus store could not be opened or queried.
    #[error("corpus store unavailable: {0}")]
    StoreUnavailable(String),

    /// A fetched row failed typed decoding. Never skipped silently.
    #[error("malformed record {id}: field `{field}`: {reason}")]
    MalformedRecord {
        id: String,
        field: &'static str,
        reason: String,
    },
}

impl RetrievalError {
    pub fn malformed(id: impl Into<String>, field: &'static str, reason: impl ToString) -> Self {
        RetrievalError::MalformedRecord {
            id: id.into(),
            field,
            reason: reason.to_string(),
        }
    }
}
