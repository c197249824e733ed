pub mod analyzer;
pub mod client;
pub mod parser;
pub mod prompt;
pub mod sufficiency;
pub mod types;

pub use analyzer::*;
pub use client::*;
pub use parser::*;
pub use prompt::*;
pub use sufficiency::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis service unreachable at {0}")]
    Connection(String),

    #[error("Analysis service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
