// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

/// Integration errors. A cryptographically invalid signature or proof is
/// *not* an error: `verify`-style operations report it through
/// [`crate::scheme::Verdict`] instead.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown scheme or container: {0}")]
    Configuration(String),

    #[error("Malformed container encoding, field `{field}`: {reason}")]
    Decoding {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Member key join is not complete")]
    IncompleteKey,

    #[error("Join protocol out of sequence: {0}")]
    ProtocolState(&'static str),

    #[error("Container mismatch: expected {expected}, found {found}")]
    SchemeMismatch { expected: String, found: String },

    #[error("Malformed proof statement: {0}")]
    Statement(&'static str),

    #[error("Degenerate field element: {0}")]
    Arithmetic(&'static str),
}

impl Error {
    pub(crate) fn decoding(field: &'static str, reason: &'static str) -> Self {
        Self::Decoding { field, reason }
    }
}
