//! Error types for the parse engine.
//!
//! Only failures of the whole operation live here. Problems confined to a
//! single data line are reported as [`LineError`](crate::tokenizer::LineError)
//! and never escape the row builder.

use crate::tokenizer::LineError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Catastrophic failures that abort a parse without a partial result.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input was empty after trimming, so no header line exists.
    #[error("Input contains no header line")]
    MissingHeader,

    /// The header line itself could not be tokenized.
    #[error("Header line is malformed")]
    MalformedHeader {
        /// The tokenizer failure for line 0.
        #[source]
        source: LineError,
    },

    /// The configuration cannot drive a parse.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The caller requested cancellation before the parse finished.
    #[error("Parse cancelled after {processed} row(s)")]
    Cancelled {
        /// Rows accepted before the cancellation was observed.
        processed: usize,
    },
}

impl ParseError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Renders the error's source chain, one cause per line.
    ///
    /// Used as the `stack` of a terminal `error` message.
    pub fn source_chain(&self) -> String {
        let mut chain = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            chain.push(format!("caused by: {cause}"));
            current = cause.source();
        }
        chain.join("\n")
    }
}
