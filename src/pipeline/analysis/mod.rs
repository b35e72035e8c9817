pub mod types;
pub mod prompt;
pub mod parser;
pub mod normalize;
pub mod fallback;
pub mod backend;
pub mod gemini;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use normalize::*;
pub use fallback::*;
pub use backend::*;
pub use gemini::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Symptom description is empty")]
    EmptyInput,

    #[error("Symptom description too long ({len} characters, max {max})")]
    InputTooLong { len: usize, max: usize },

    #[error("No inference credential configured")]
    Configuration,

    #[error("Inference request failed{}: {body}", status_suffix(.status))]
    Transport { status: Option<u16>, body: String },

    #[error("Malformed inference reply: {0}")]
    ResponseFormat(String),

    #[error("Could not read analysis from reply: {0}")]
    Parse(#[from] ReplyParseError),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}
