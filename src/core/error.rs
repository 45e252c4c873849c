use crate::core::types::{Phase, PhaseError};
use thiserror::Error;

/// Failure taxonomy for the scrape pipeline. Every stage converts its own
/// failures into one of these; the pipeline records them as phase-tagged
/// error entries and keeps going instead of aborting the request.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("static fetch failed: {0}")]
    Fetch(String),

    #[error("browser render failed: {0}")]
    Render(String),

    #[error("content extraction failed: {0}")]
    Parse(String),
}

impl ScrapeError {
    pub fn phase(&self) -> Phase {
        match self {
            ScrapeError::Fetch(_) => Phase::Fetch,
            ScrapeError::Render(_) => Phase::Render,
            ScrapeError::Parse(_) => Phase::Parse,
        }
    }

    pub fn to_phase_error(&self) -> PhaseError {
        PhaseError {
            message: self.to_string(),
            phase: self.phase(),
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::Fetch(err.to_string())
    }
}
