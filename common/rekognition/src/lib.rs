//! Common Rekognition client abstraction.
//!
//! Wraps the one Rekognition operation we need, `SearchFacesByImage`, behind a trait so
//! handlers can be tested against a mock. The mock is a plain implementation of the trait,
//! always compiled so other crates can use it in their tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_rekognition::error::{DisplayErrorContext, SdkError};
use aws_sdk_rekognition::operation::search_faces_by_image::SearchFacesByImageError;
use aws_sdk_rekognition::types::{Image, S3Object};
use aws_sdk_rekognition::Client as AwsRekognitionSdkClient;
use thiserror::Error;
use tracing::debug;

pub mod config;
pub mod query;

pub use config::RekognitionConfig;
pub use query::{FaceCandidate, FaceSearchQuery, ImageReference};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RekognitionError {
    #[error("face collection not found: {0}")]
    CollectionNotFound(String),
    #[error("image could not be used for a face search: {0}")]
    InvalidImage(String),
    #[error("face search was throttled: {0}")]
    Throttled(String),
    #[error("face search timed out: {0}")]
    Timeout(String),
    #[error("face search was cancelled: {0}")]
    Cancelled(String),
    #[error("Rekognition operation failed: {0}")]
    OperationFailed(String),
}

impl From<SdkError<SearchFacesByImageError>> for RekognitionError {
    fn from(err: SdkError<SearchFacesByImageError>) -> Self {
        let error_message = DisplayErrorContext(&err).to_string();

        if let SdkError::TimeoutError(_) = err {
            return RekognitionError::Timeout(error_message);
        }

        match err.into_service_error() {
            SearchFacesByImageError::ResourceNotFoundException(_) => {
                RekognitionError::CollectionNotFound(error_message)
            }
            SearchFacesByImageError::InvalidS3ObjectException(_)
            | SearchFacesByImageError::InvalidImageFormatException(_)
            | SearchFacesByImageError::ImageTooLargeException(_) => {
                RekognitionError::InvalidImage(error_message)
            }
            SearchFacesByImageError::ThrottlingException(_)
            | SearchFacesByImageError::ProvisionedThroughputExceededException(_) => {
                RekognitionError::Throttled(error_message)
            }
            _ => RekognitionError::OperationFailed(error_message),
        }
    }
}

/// Rekognition client trait that both real and mock implementations use
#[async_trait]
pub trait RekognitionClient: Send + Sync {
    /// Search the query's collection for faces matching the largest face in the query's image.
    /// Returns every match at or above the query's threshold, at most `max_faces` of them,
    /// in no particular order.
    async fn search_faces_by_image(
        &self,
        query: &FaceSearchQuery,
    ) -> Result<Vec<FaceCandidate>, RekognitionError>;
}

/// Real Rekognition client implementation
pub struct RekognitionImpl {
    client: AwsRekognitionSdkClient,
}

impl RekognitionImpl {
    pub fn new(client: AwsRekognitionSdkClient) -> Self {
        Self { client }
    }

    pub async fn from_config(config: &RekognitionConfig) -> Self {
        Self::new(config.build_client().await)
    }
}

#[async_trait]
impl RekognitionClient for RekognitionImpl {
    async fn search_faces_by_image(
        &self,
        query: &FaceSearchQuery,
    ) -> Result<Vec<FaceCandidate>, RekognitionError> {
        let image = Image::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&query.image().bucket)
                    .name(&query.image().key)
                    .build(),
            )
            .build();

        let output = self
            .client
            .search_faces_by_image()
            .collection_id(query.collection_id())
            .image(image)
            .face_match_threshold(query.face_match_threshold())
            .max_faces(query.max_faces())
            .send()
            .await?;

        debug!(
            searched_face_confidence = ?output.searched_face_confidence(),
            face_model_version = ?output.face_model_version(),
            "SearchFacesByImage returned"
        );

        Ok(output
            .face_matches()
            .iter()
            .map(FaceCandidate::from)
            .collect())
    }
}

/// Mock Rekognition client for testing - always available, no conditional compilation needed
#[derive(Clone, Default)]
pub struct MockRekognitionClient {
    search_responses: HashMap<String, Result<Vec<FaceCandidate>, RekognitionError>>,
    delay: Option<Duration>,
    received: Arc<Mutex<Vec<FaceSearchQuery>>>,
}

impl MockRekognitionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set up a response for search_faces_by_image() - keyed on the searched image's bucket and key
    pub fn search_faces_by_image_ret(
        mut self,
        bucket: &str,
        key: &str,
        response: Result<Vec<FaceCandidate>, RekognitionError>,
    ) -> Self {
        let cache_key = format!("{bucket}:{key}");
        self.search_responses.insert(cache_key, response);
        self
    }

    /// Make every search take at least `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every query this client was asked to run, in call order.
    pub fn received_queries(&self) -> Vec<FaceSearchQuery> {
        self.received
            .lock()
            .expect("mock query log poisoned")
            .clone()
    }
}

#[async_trait]
impl RekognitionClient for MockRekognitionClient {
    async fn search_faces_by_image(
        &self,
        query: &FaceSearchQuery,
    ) -> Result<Vec<FaceCandidate>, RekognitionError> {
        self.received
            .lock()
            .expect("mock query log poisoned")
            .push(query.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let image = query.image();
        let cache_key = format!("{}:{}", image.bucket, image.key);
        match self.search_responses.get(&cache_key) {
            Some(response) => response.clone(),
            None => Err(RekognitionError::InvalidImage(format!(
                "no such object: s3://{}/{}",
                image.bucket, image.key
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_rekognition::config::http::HttpResponse;
    use aws_sdk_rekognition::types::error::{
        ImageTooLargeException, InternalServerError, InvalidImageFormatException,
        InvalidS3ObjectException, ProvisionedThroughputExceededException,
        ResourceNotFoundException, ThrottlingException,
    };
    use aws_smithy_types::body::SdkBody;

    use super::*;

    fn query(bucket: &str, key: &str) -> FaceSearchQuery {
        FaceSearchQuery::new("faces", ImageReference::new(bucket, key), 70.0, 3)
    }

    #[tokio::test]
    async fn test_mock_rekognition_client_returns_configured_matches() {
        let candidate = FaceCandidate {
            face_id: Some("11111111-2222-3333-4444-555555555555".to_string()),
            similarity: Some(99.1),
        };
        let client = MockRekognitionClient::new().search_faces_by_image_ret(
            "uploads",
            "jane.jpg",
            Ok(vec![candidate.clone()]),
        );

        let result = client
            .search_faces_by_image(&query("uploads", "jane.jpg"))
            .await;
        assert_eq!(result.unwrap(), vec![candidate]);
    }

    #[tokio::test]
    async fn test_mock_rekognition_client_returns_configured_error() {
        let client = MockRekognitionClient::new().search_faces_by_image_ret(
            "uploads",
            "jane.jpg",
            Err(RekognitionError::Throttled("slow down".to_string())),
        );

        let result = client
            .search_faces_by_image(&query("uploads", "jane.jpg"))
            .await;
        assert!(matches!(result, Err(RekognitionError::Throttled(_))));
    }

    #[tokio::test]
    async fn test_mock_rekognition_client_default_invalid_image() {
        let client = MockRekognitionClient::new();

        // Anything not explicitly configured behaves like a missing S3 object
        let result = client
            .search_faces_by_image(&query("uploads", "missing.jpg"))
            .await;
        assert!(matches!(result, Err(RekognitionError::InvalidImage(_))));
    }

    #[tokio::test]
    async fn test_mock_rekognition_client_records_queries() {
        let client = MockRekognitionClient::new().search_faces_by_image_ret(
            "uploads",
            "a.jpg",
            Ok(vec![]),
        );
        // Clones share the log, so a handler holding a clone is still observable
        let handle = client.clone();

        client
            .search_faces_by_image(&query("uploads", "a.jpg"))
            .await
            .unwrap();
        assert!(client
            .search_faces_by_image(&query("uploads", "b.jpg"))
            .await
            .is_err());

        let received = handle.received_queries();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].image().key, "a.jpg");
        assert_eq!(received[1].image().key, "b.jpg");
    }

    #[test]
    fn test_candidate_from_face_match() {
        let face_match = aws_sdk_rekognition::types::FaceMatch::builder()
            .similarity(87.5)
            .face(
                aws_sdk_rekognition::types::Face::builder()
                    .face_id("abc")
                    .build(),
            )
            .build();

        let candidate = FaceCandidate::from(&face_match);
        assert_eq!(candidate.face_id.as_deref(), Some("abc"));
        assert_eq!(candidate.similarity, Some(87.5));
    }

    #[test]
    fn test_rekognition_error_from_sdk_timeout() {
        let err: SdkError<SearchFacesByImageError> = SdkError::timeout_error("operation timeout");

        let rekognition_error = RekognitionError::from(err);
        assert!(matches!(rekognition_error, RekognitionError::Timeout(_)));
    }

    fn service_error(err: SearchFacesByImageError) -> SdkError<SearchFacesByImageError> {
        SdkError::service_error(
            err,
            HttpResponse::new(400u16.try_into().unwrap(), SdkBody::empty()),
        )
    }

    #[test]
    fn test_rekognition_error_from_missing_collection() {
        let err = service_error(SearchFacesByImageError::ResourceNotFoundException(
            ResourceNotFoundException::builder()
                .message("collection enrolled-faces not found")
                .build(),
        ));

        match RekognitionError::from(err) {
            RekognitionError::CollectionNotFound(message) => {
                assert!(message.contains("collection enrolled-faces not found"))
            }
            other => panic!("expected CollectionNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_rekognition_error_from_unusable_image() {
        let errors = [
            SearchFacesByImageError::InvalidS3ObjectException(
                InvalidS3ObjectException::builder()
                    .message("unable to get object metadata from S3")
                    .build(),
            ),
            SearchFacesByImageError::InvalidImageFormatException(
                InvalidImageFormatException::builder()
                    .message("request has invalid image format")
                    .build(),
            ),
            SearchFacesByImageError::ImageTooLargeException(
                ImageTooLargeException::builder()
                    .message("image size is too large")
                    .build(),
            ),
        ];
        let expected = [
            "unable to get object metadata from S3",
            "request has invalid image format",
            "image size is too large",
        ];

        for (err, expected) in errors.into_iter().zip(expected) {
            match RekognitionError::from(service_error(err)) {
                RekognitionError::InvalidImage(message) => assert!(message.contains(expected)),
                other => panic!("expected InvalidImage, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rekognition_error_from_throttling() {
        let errors = [
            SearchFacesByImageError::ThrottlingException(
                ThrottlingException::builder().message("slow down").build(),
            ),
            SearchFacesByImageError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder()
                    .message("throughput exceeded")
                    .build(),
            ),
        ];
        let expected = ["slow down", "throughput exceeded"];

        for (err, expected) in errors.into_iter().zip(expected) {
            match RekognitionError::from(service_error(err)) {
                RekognitionError::Throttled(message) => assert!(message.contains(expected)),
                other => panic!("expected Throttled, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rekognition_error_from_other_service_error() {
        let err = service_error(SearchFacesByImageError::InternalServerError(
            InternalServerError::builder()
                .message("internal failure")
                .build(),
        ));

        match RekognitionError::from(err) {
            RekognitionError::OperationFailed(message) => {
                assert!(message.contains("internal failure"))
            }
            other => panic!("expected OperationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_candidate_from_empty_face_match() {
        let face_match = aws_sdk_rekognition::types::FaceMatch::builder().build();

        assert_eq!(FaceCandidate::from(&face_match), FaceCandidate::default());
    }
}
