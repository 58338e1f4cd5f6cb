use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no candidates found")]
    NoCandidates,
    #[error(
        "not enough legal copies: need {target}, only {available} available \
         (short by {shortfall})"
    )]
    SizeShortfall {
        target: u32,
        available: u32,
        shortfall: u32,
    },
    #[error("card {name} is outside the {identity} identity")]
    ColorViolation { name: String, identity: String },
    #[error("card {name} has {count} copies, limit is {max}")]
    CopyLimit { name: String, count: u32, max: u32 },
    #[error("deck has {actual} cards, expected {expected}")]
    SizeMismatch { expected: u32, actual: u32 },
    #[error("unknown card in allocation: {0}")]
    UnknownCard(String),
}

impl BuildError {
    pub fn shortfall(target: u32, available: u32) -> Self {
        Self::SizeShortfall {
            target,
            available,
            shortfall: target.saturating_sub(available),
        }
    }
}
