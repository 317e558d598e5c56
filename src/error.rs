//! Error types for rwlist

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Thread count must be at least 1")]
    NoThreads,

    #[error("{name} must be between 0 and 1, got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("Search and insert fractions add up to {0}, more than 1")]
    FractionsExceedOne(f64),

    #[error("Invalid answer {answer:?} for {field}: {reason}")]
    Parse {
        field: &'static str,
        answer: String,
        reason: String,
    },

    #[error("Input ended before {0} was given")]
    InputClosed(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
