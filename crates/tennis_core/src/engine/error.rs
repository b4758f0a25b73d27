use thiserror::Error;

/// Failures inside a single simulated match.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("tiebreak undecided after {points} points ({}-{})", .score[0], .score[1])]
    StalledTiebreak { points: u32, score: [u32; 2] },
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
