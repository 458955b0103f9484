use common_rekognition::RekognitionError;
use lambda_runtime::Diagnostic;
use thiserror::Error;

/// Message reported when the searched face is already enrolled in the collection.
pub const FACE_ALREADY_EXISTS_MESSAGE: &str = "Face in the picture is already in the system.";

/// Enumeration of errors related to decoding an S3 object key from an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyDecodeError {
    #[error("event is missing the S3 bucket")]
    MissingBucket,
    #[error("event is missing the S3 key")]
    MissingKey,
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
    #[error("decoded key is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Enumeration of the ways a single invocation can end other than with no match.
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("failed to decode S3 key {raw_key:?}: {source}")]
    Decode {
        raw_key: String,
        #[source]
        source: KeyDecodeError,
    },
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("failed to search faces by image in collection {collection_id} for s3://{bucket}/{key}: {source}")]
    RemoteCall {
        collection_id: String,
        bucket: String,
        key: String,
        #[source]
        source: RekognitionError,
    },
    /// Not a fault: the face is already enrolled.
    #[error("Face in the picture is already in the system.")]
    DuplicateDetected,
}

impl DedupError {
    /// Stable name for the kind of error, reported to Lambda as the `errorType`.
    pub fn error_type(&self) -> &'static str {
        match self {
            DedupError::Decode { .. } => "DecodeError",
            DedupError::Configuration(_) => "ConfigurationError",
            DedupError::RemoteCall { .. } => "RemoteCallError",
            DedupError::DuplicateDetected => "FaceAlreadyExistsError",
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, DedupError::DuplicateDetected)
    }
}

impl From<DedupError> for Diagnostic {
    fn from(error: DedupError) -> Self {
        Diagnostic {
            error_type: error.error_type().to_owned(),
            error_message: error.to_string(),
        }
    }
}
