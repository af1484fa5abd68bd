//! Error type for reading and plotting heap capacity logs.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeapError {
    /// The input file could not be opened or read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A data row is shorter than the last column we read.
    #[error("line {line}: missing column {column}, found only {found} column(s)")]
    MissingColumn {
        line: usize,
        column: usize,
        found: usize,
    },

    /// A capacity value is not a number.
    #[error("line {line}, column {column}: could not parse {value:?} as kilobytes")]
    Parse {
        line: usize,
        column: usize,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// A capacity value parsed to infinity or NaN.
    #[error("line {line}, column {column}: {value:?} is not a finite number of kilobytes")]
    NonFinite {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("no finite data to plot")]
    Empty,

    #[error("plotting failed: {0}")]
    Plot(String),
}

impl<E> From<DrawingAreaErrorKind<E>> for HeapError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        HeapError::Plot(err.to_string())
    }
}
