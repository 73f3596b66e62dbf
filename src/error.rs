//! Crate-level error type

use crate::config::ConfigError;
use crate::instrument::InstrumentError;
use crate::interpreter::RuntimeError;
use crate::parser::ParseError;
use crate::trace::TraceError;
use thiserror::Error;

/// Any failure between source text and a detached trace
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
