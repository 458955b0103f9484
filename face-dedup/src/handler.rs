use std::sync::Arc;
use std::time::{Duration, SystemTime};

use common_rekognition::{FaceCandidate, FaceSearchQuery, RekognitionClient, RekognitionError};
use lambda_runtime::LambdaEvent;
use tracing::{error, info};

use crate::config::Config;
use crate::error::DedupError;
use crate::event::ImageEvent;
use crate::outcome::Outcome;
use crate::query::build_query;

/// Time kept back from the invocation deadline so a cancelled search is still reported
/// before Lambda freezes the function.
pub const DEADLINE_MARGIN: Duration = Duration::from_millis(300);

/// Checks uploaded images against an enrolled face collection.
///
/// Holds nothing that changes between invocations: the configuration is read once at start
/// and the client is shared by every invocation the process serves.
pub struct FaceDedupHandler {
    config: Config,
    client: Arc<dyn RekognitionClient>,
}

impl FaceDedupHandler {
    pub fn new(config: Config, client: Arc<dyn RekognitionClient>) -> Self {
        Self { config, client }
    }

    /// Entry point for the Lambda runtime. The remote call has to finish `DEADLINE_MARGIN`
    /// before the invocation deadline.
    pub async fn invoke(&self, event: LambdaEvent<ImageEvent>) -> Result<String, DedupError> {
        // A zero deadline means the runtime did not provide one
        let remaining = (event.context.deadline != 0)
            .then(|| search_budget(event.context.deadline(), SystemTime::now()));
        self.handle(event.payload, remaining).await
    }

    /// Decode the event, search the collection and resolve the outcome.
    ///
    /// `remaining` bounds the face search. When it runs out the search is abandoned and
    /// reported as a cancelled remote call, never as an empty result.
    pub async fn handle(
        &self,
        event: ImageEvent,
        remaining: Option<Duration>,
    ) -> Result<String, DedupError> {
        info!(
            s3_bucket = %event.s3_bucket,
            s3_key = %event.s3_key,
            "Reading input from event"
        );

        let image = event.image_reference()?;
        let query = build_query(&self.config, image)?;
        let candidates = self.search(&query, remaining).await?;

        info!(
            collection_id = query.collection_id(),
            matches = candidates.len(),
            candidates = ?candidates,
            "Search results"
        );

        let outcome = Outcome::resolve(&candidates);
        info!(outcome = ?outcome, s3_key = %query.image().key, "Resolved outcome");

        outcome.into_result()
    }

    async fn search(
        &self,
        query: &FaceSearchQuery,
        remaining: Option<Duration>,
    ) -> Result<Vec<FaceCandidate>, DedupError> {
        let search = self.client.search_faces_by_image(query);

        let result = match remaining {
            Some(remaining) => match tokio::time::timeout(remaining, search).await {
                Ok(result) => result,
                Err(_) => Err(RekognitionError::Cancelled(format!(
                    "invocation deadline reached after {}ms",
                    remaining.as_millis()
                ))),
            },
            None => search.await,
        };

        result.map_err(|source| {
            error!(
                collection_id = query.collection_id(),
                s3_bucket = %query.image().bucket,
                s3_key = %query.image().key,
                error = %source,
                "Failed to search faces by image"
            );

            DedupError::RemoteCall {
                collection_id: query.collection_id().to_owned(),
                bucket: query.image().bucket.clone(),
                key: query.image().key.clone(),
                source,
            }
        })
    }
}

/// Time the search may take when invoked at `now`: what is left until `deadline`, minus
/// `DEADLINE_MARGIN`. Zero once the deadline is within the margin or already past.
fn search_budget(deadline: SystemTime, now: SystemTime) -> Duration {
    deadline
        .duration_since(now)
        .unwrap_or(Duration::ZERO)
        .saturating_sub(DEADLINE_MARGIN)
}
