//! Analysis stage: back-fill region attributes from coordinates.
//!
//! Posts that arrived with native coordinates skipped the free-text lookup
//! in the parse stage and so carry no region attributes. This stage reverse
//! geocodes them against the city repository, filling only fields that are
//! still empty, then forwards every post to the stats queue.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;
use uuid::{uuid, Uuid};

use votepulse_common::{Post, VotePulseError};
use votepulse_geo::lookup::{nearest_city, CityRepository};
use votepulse_geo::place::qualified_state_code;
use votepulse_store::{QueueStore, ANALYSIS_QUEUE, STATS_QUEUE};
use votepulse_worker::queue_loop::QueueWorker;

pub const ANALYSIS_WORKER_ID: Uuid = uuid!("7e391df6-6702-4341-9db4-d8af4f6117e6");

/// Queue worker enriching located posts with region attributes.
pub struct AnalysisWorker {
    queue: Arc<dyn QueueStore>,
    cities: Arc<dyn CityRepository>,
}

impl AnalysisWorker {
    pub fn new(queue: Arc<dyn QueueStore>, cities: Arc<dyn CityRepository>) -> Self {
        Self { queue, cities }
    }

    async fn handle(&self, payload: &str) -> Result<()> {
        let mut post: Post = serde_json::from_str(payload)
            .map_err(|e| VotePulseError::Parse(format!("malformed post: {e}")))?;

        let attrs = &post.location_attributes;
        let incomplete =
            attrs.country.is_empty() || attrs.state.is_empty() || attrs.state_code.is_empty();
        if post.has_coordinates() && incomplete {
            self.fill_from_coordinates(&mut post).await;
        }

        let serialized = serde_json::to_string(&post)?;
        self.queue.push(STATS_QUEUE, &serialized).await?;
        Ok(())
    }

    /// Append-only enrichment: existing non-empty attributes are kept even
    /// when the reverse lookup disagrees with them.
    async fn fill_from_coordinates(&self, post: &mut Post) {
        let place = match nearest_city(self.cities.as_ref(), post.loc[0], post.loc[1]).await {
            Ok(Some(place)) => place,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, post = %post.id, "Reverse geocode failed");
                return;
            }
        };

        let attrs = &mut post.location_attributes;
        if attrs.country.is_empty() {
            attrs.country = place.country.clone();
        }
        if attrs.state.is_empty() {
            attrs.state = place.state.clone();
        }
        if attrs.state_code.is_empty() {
            attrs.state_code = qualified_state_code(&place.country_code, &place.state_code);
        }
    }
}

#[async_trait]
impl QueueWorker for AnalysisWorker {
    fn id(&self) -> Uuid {
        ANALYSIS_WORKER_ID
    }

    fn name(&self) -> &str {
        "Analysis Queue"
    }

    fn queue_name(&self) -> &str {
        ANALYSIS_QUEUE
    }

    async fn parse(&self, payload: String) {
        if let Err(e) = self.handle(&payload).await {
            warn!(error = %e, "Dropping unparseable post");
        }
    }
}
