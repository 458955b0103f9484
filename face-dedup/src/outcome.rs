use common_rekognition::FaceCandidate;

use crate::error::DedupError;

pub const NO_MATCH_MESSAGE: &str = "No matching faces found.";

/// Result of a completed face search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoMatch,
    DuplicateDetected,
}

impl Outcome {
    /// Rekognition already applied the similarity threshold, so any candidate at all
    /// means the face is enrolled. Which face matched does not matter.
    pub fn resolve(candidates: &[FaceCandidate]) -> Self {
        if candidates.is_empty() {
            Outcome::NoMatch
        } else {
            Outcome::DuplicateDetected
        }
    }

    pub fn into_result(self) -> Result<String, DedupError> {
        match self {
            Outcome::NoMatch => Ok(NO_MATCH_MESSAGE.to_owned()),
            Outcome::DuplicateDetected => Err(DedupError::DuplicateDetected),
        }
    }
}
