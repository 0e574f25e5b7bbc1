// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Domain error taxonomy.
///
/// `Validation`, `NotFound` and `Conflict` abort the operation before any
/// write. `Reconciliation` is the one asymmetric case: it is raised only
/// after the triggering mutation has already been committed, so callers must
/// report it as a secondary warning rather than undoing the mutation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Missing record, or a record owned by another user. The two cases are
    /// deliberately indistinguishable.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("budget reconciliation failed: {0}")]
    Reconciliation(#[source] Box<Error>),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A stored TEXT amount failed to parse as a decimal.
    #[error("invalid decimal '{value}' in column {column}")]
    BadDecimal {
        column: &'static str,
        value: String,
    },
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}
