use common_rekognition::{FaceSearchQuery, ImageReference};

use crate::config::Config;
use crate::error::DedupError;

/// Minimum similarity, in percent, for Rekognition to report a face as a match.
pub const FACE_MATCH_THRESHOLD: f32 = 70.0;
/// Largest number of matching faces requested. Any match is enough to call it a duplicate.
pub const MAX_FACES: i32 = 3;

/// Build the face search for `image` against the configured collection.
/// Threshold and result limit are policy and never come from the event.
pub fn build_query(config: &Config, image: ImageReference) -> Result<FaceSearchQuery, DedupError> {
    if config.collection_id.trim().is_empty() {
        return Err(DedupError::Configuration(
            "REKOGNITION_COLLECTION_ID is not set".to_owned(),
        ));
    }

    Ok(FaceSearchQuery::new(
        &config.collection_id,
        image,
        FACE_MATCH_THRESHOLD,
        MAX_FACES,
    ))
}
