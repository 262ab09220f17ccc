//! Parse stage: raw Twitter statuses into canonical posts.
//!
//! Pops `queue:twitter:parse`, normalizes each status envelope into a
//! [`Post`], resolves free-text profile locations when the status carries no
//! native coordinates, and pushes the result to `queue:postitems:analysis`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::warn;
use uuid::{uuid, Uuid};

use votepulse_common::{day_bucket, hour_bucket, now_ms, Post, PostStats, VotePulseError};
use votepulse_geo::lookup::{determine_location, CityRepository};
use votepulse_geo::place::qualified_state_code;
use votepulse_store::{QueueStore, ANALYSIS_QUEUE, PARSE_QUEUE};
use votepulse_worker::queue_loop::QueueWorker;

pub const PARSE_WORKER_ID: Uuid = uuid!("b0671772-b892-4a98-b37d-2bf8e4129f5e");

/// Twitter's legacy timestamp format, e.g. `Wed Nov 07 04:01:09 +0000 2012`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

// --- Wire shapes (the subset of a raw status the pipeline reads) ---

#[derive(Deserialize)]
struct StreamEnvelope {
    #[serde(rename = "sourceName")]
    source_name: Option<String>,
    #[serde(rename = "sourceUri")]
    source_uri: Option<String>,
    data: Option<TwitterStatus>,
}

#[derive(Deserialize)]
struct TwitterStatus {
    id_str: String,
    created_at: String,
    #[serde(default)]
    text: String,
    user: Option<TwitterUser>,
    #[serde(default)]
    entities: Option<Entities>,
    #[serde(default)]
    coordinates: Option<GeoPoint>,
    #[serde(default)]
    geo: Option<GeoPoint>,
    #[serde(default)]
    place: Option<TwitterPlace>,
    #[serde(default)]
    retweeted_status: Option<Box<TwitterStatus>>,
}

#[derive(Deserialize)]
struct TwitterUser {
    screen_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    profile_image_url: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    time_zone: Option<String>,
    #[serde(default)]
    followers_count: i64,
}

#[derive(Deserialize, Default)]
struct Entities {
    #[serde(default)]
    urls: Vec<UrlEntity>,
    #[serde(default)]
    user_mentions: Vec<MentionEntity>,
    #[serde(default)]
    media: Vec<MediaEntity>,
}

#[derive(Deserialize)]
struct UrlEntity {
    url: String,
    expanded_url: String,
}

#[derive(Deserialize)]
struct MentionEntity {
    screen_name: String,
}

#[derive(Deserialize)]
struct MediaEntity {
    url: String,
    media_url: String,
}

#[derive(Deserialize)]
struct GeoPoint {
    #[serde(default)]
    coordinates: Option<[f64; 2]>,
}

#[derive(Deserialize)]
struct TwitterPlace {
    #[serde(default)]
    bounding_box: Option<BoundingBox>,
}

#[derive(Deserialize)]
struct BoundingBox {
    /// One ring of corner points, `[lng, lat]` each.
    #[serde(default)]
    coordinates: Vec<Vec<[f64; 2]>>,
}

// --- Worker ---

/// Queue worker turning raw stream envelopes into canonical posts.
pub struct ParseWorker {
    queue: Arc<dyn QueueStore>,
    cities: Arc<dyn CityRepository>,
}

impl ParseWorker {
    pub fn new(queue: Arc<dyn QueueStore>, cities: Arc<dyn CityRepository>) -> Self {
        Self { queue, cities }
    }

    async fn handle(&self, payload: &str) -> Result<()> {
        let envelope: StreamEnvelope = serde_json::from_str(payload)
            .map_err(|e| VotePulseError::Parse(format!("malformed stream envelope: {e}")))?;
        let Some(status) = envelope.data else {
            return Ok(());
        };
        let Some(user) = &status.user else {
            // Statuses without an author cannot be attributed; drop silently.
            return Ok(());
        };
        if user.screen_name.is_empty() {
            return Ok(());
        }

        let source_name = envelope.source_name.as_deref().unwrap_or("Undefined");
        let source_uri = envelope.source_uri.as_deref().unwrap_or("");

        let mut post = build_post(&status, source_name, source_uri)?;

        let raw_location = post.user_attributes.location.clone();
        if !post.has_coordinates() && !raw_location.is_empty() {
            self.resolve_location(&mut post, &raw_location, user).await;
        }

        let serialized = serde_json::to_string(&post)?;
        self.queue.push(ANALYSIS_QUEUE, &serialized).await?;
        Ok(())
    }

    /// Best-effort free-text resolution. Any failure leaves the post
    /// unlocated; it still flows downstream.
    async fn resolve_location(&self, post: &mut Post, raw_location: &str, user: &TwitterUser) {
        let lookup = determine_location(
            self.cities.as_ref(),
            raw_location,
            user.time_zone.as_deref(),
            user.lang.as_deref(),
        )
        .await;

        match lookup {
            Ok(result) => {
                if let Some(place) = result.place {
                    post.loc = place.loc;
                    post.location_attributes.country = place.country;
                    post.location_attributes.state = place.state;
                    post.location_attributes.state_code =
                        qualified_state_code(&place.country_code, &place.state_code);
                }
            }
            Err(e) => {
                warn!(error = %e, location = %raw_location, "Location lookup failed");
            }
        }
    }
}

#[async_trait]
impl QueueWorker for ParseWorker {
    fn id(&self) -> Uuid {
        PARSE_WORKER_ID
    }

    fn name(&self) -> &str {
        "Twitter Queue"
    }

    fn queue_name(&self) -> &str {
        PARSE_QUEUE
    }

    async fn parse(&self, payload: String) {
        if let Err(e) = self.handle(&payload).await {
            warn!(error = %e, "Dropping unparseable stream item");
        }
    }
}

fn build_post(status: &TwitterStatus, source_name: &str, source_uri: &str) -> Result<Post> {
    let user = status
        .user
        .as_ref()
        .ok_or_else(|| VotePulseError::Parse("status without an author".into()))?;

    let time_ms = DateTime::parse_from_str(&status.created_at, CREATED_AT_FORMAT)
        .map_err(|_| VotePulseError::Parse(format!("bad created_at: {}", status.created_at)))?
        .timestamp_millis();

    let mut post = Post {
        id: format!("tw:{}", status.id_str),
        ident: status.id_str.clone(),
        time_ms,
        hour_ms: hour_bucket(time_ms),
        day_ms: day_bucket(time_ms),
        aggregated_ms: now_ms(),
        text: status.text.clone(),
        source_name: source_name.to_string(),
        source_uri: source_uri.to_string(),
        author: user.screen_name.clone(),
        profile_url: format!("https://twitter.com/{}", user.screen_name),
        lang: user.lang.clone().unwrap_or_default(),
        network: "Twitter".to_string(),
        loc: [0.0, 0.0],
        ..Post::default()
    };

    post.user_attributes.bio = user.description.clone().unwrap_or_default();
    post.user_attributes.display_name = user.name.clone().unwrap_or_default();
    post.user_attributes.profile_image = user.profile_image_url.clone().unwrap_or_default();
    post.user_attributes.url = user.url.clone().unwrap_or_default();
    post.user_attributes.location = user
        .location
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if let Some(entities) = &status.entities {
        for url in &entities.urls {
            post.text = post.text.replace(&url.url, &url.expanded_url);
            post.urls.push(url.expanded_url.clone());
        }
        for mention in &entities.user_mentions {
            post.mentions.push(mention.screen_name.clone());
        }
        for media in &entities.media {
            post.text = post.text.replace(&media.url, &media.media_url);
            post.urls.push(media.media_url.clone());
        }
    }

    post.loc = extract_coordinates(status);

    if let Some(original) = &status.retweeted_status {
        if let Some(original_user) = &original.user {
            post.is_reshare = true;
            post.original_ident = Some(original.id_str.clone());
            post.original_author = Some(original_user.screen_name.clone());
            post.original_profile_url =
                Some(format!("http://twitter.com/{}", original_user.screen_name));
            post.original_time_ms =
                DateTime::parse_from_str(&original.created_at, CREATED_AT_FORMAT)
                    .ok()
                    .map(|t| t.timestamp_millis());
            post.original_reach = Some(original_user.followers_count);
        }
    }

    let reach = user.followers_count;
    post.stats = PostStats {
        reach,
        spread: reach,
        topic_reach: if post.is_reshare { 0 } else { reach },
        topic_spread: if post.is_reshare { reach } else { 0 },
    };

    Ok(post)
}

/// Native coordinates, in preference order: the point geometry, the legacy
/// geo field, then the centroid of the place bounding box (averaging the
/// first and third corner of the ring).
fn extract_coordinates(status: &TwitterStatus) -> [f64; 2] {
    if let Some(point) = status.coordinates.as_ref().and_then(|g| g.coordinates) {
        return point;
    }
    if let Some(point) = status.geo.as_ref().and_then(|g| g.coordinates) {
        return point;
    }
    if let Some(ring) = status
        .place
        .as_ref()
        .and_then(|p| p.bounding_box.as_ref())
        .map(|b| &b.coordinates)
    {
        if let Some(corners) = ring.first() {
            if corners.len() >= 3 {
                let bottom_right = corners[0];
                let top_left = corners[2];
                return [
                    (bottom_right[0] + top_left[0]) / 2.0,
                    (bottom_right[1] + top_left[1]) / 2.0,
                ];
            }
        }
    }
    [0.0, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{raw_status, MockCityRepo, MockQueue, RawStatusOptions};
    use votepulse_geo::place::CityRecord;

    fn worker(queue: &MockQueue, cities: MockCityRepo) -> ParseWorker {
        ParseWorker::new(Arc::new(queue.clone()), Arc::new(cities))
    }

    fn popped_post(queue: &MockQueue) -> Post {
        let raw = queue
            .pushed(ANALYSIS_QUEUE)
            .pop()
            .expect("a post on the analysis queue");
        serde_json::from_str(&raw).expect("well-formed post JSON")
    }

    #[tokio::test]
    async fn builds_a_canonical_post_from_a_plain_status() {
        let queue = MockQueue::new();
        let worker = worker(&queue, MockCityRepo::empty());

        let raw = raw_status(RawStatusOptions {
            id_str: "261021765414748161",
            text: "Just #voted! t.co/abc @friend",
            screen_name: "alice",
            followers: 120,
            ..RawStatusOptions::default()
        });
        worker.parse(raw).await;

        let post = popped_post(&queue);
        assert_eq!(post.id, "tw:261021765414748161");
        assert_eq!(post.ident, "261021765414748161");
        assert_eq!(post.author, "alice");
        assert_eq!(post.profile_url, "https://twitter.com/alice");
        assert_eq!(post.network, "Twitter");
        assert_eq!(post.source_name, "Twitter Filter");
        assert_eq!(post.hour_ms % 3_600_000, 0);
        assert_eq!(post.day_ms % 86_400_000, 0);
        assert!(post.time_ms >= post.hour_ms && post.time_ms - post.hour_ms < 3_600_000);
        assert_eq!(post.stats.reach, 120);
        assert_eq!(post.stats.topic_reach, 120);
        assert_eq!(post.stats.topic_spread, 0);
        assert!(!post.is_reshare);
    }

    #[tokio::test]
    async fn expands_urls_and_media_into_text_and_collects_mentions() {
        let queue = MockQueue::new();
        let worker = worker(&queue, MockCityRepo::empty());

        let raw = raw_status(RawStatusOptions {
            text: "I #voted t.co/short pic t.co/m1",
            urls: &[("t.co/short", "https://example.com/article")],
            media: &[("t.co/m1", "https://pbs.example.com/photo.jpg")],
            mentions: &["bob", "carol"],
            ..RawStatusOptions::default()
        });
        worker.parse(raw).await;

        let post = popped_post(&queue);
        assert_eq!(
            post.text,
            "I #voted https://example.com/article pic https://pbs.example.com/photo.jpg"
        );
        assert_eq!(
            post.urls,
            vec![
                "https://example.com/article".to_string(),
                "https://pbs.example.com/photo.jpg".to_string()
            ]
        );
        assert_eq!(post.mentions, vec!["bob".to_string(), "carol".to_string()]);
    }

    #[tokio::test]
    async fn native_point_coordinates_win_over_profile_location() {
        let queue = MockQueue::new();
        // Repo would resolve "paris" if queried; native coordinates must
        // preempt the lookup entirely.
        let cities = MockCityRepo::with(
            "paris",
            vec![CityRecord {
                name: "paris".into(),
                country: "France".into(),
                country_code: "FR".into(),
                location: [2.35, 48.85],
                ..CityRecord::default()
            }],
        );
        let worker = worker(&queue, cities);

        let raw = raw_status(RawStatusOptions {
            location: Some("Paris"),
            point: Some([-73.99, 40.73]),
            ..RawStatusOptions::default()
        });
        worker.parse(raw).await;

        let post = popped_post(&queue);
        assert_eq!(post.loc, [-73.99, 40.73]);
        assert!(post.location_attributes.is_empty());
    }

    #[tokio::test]
    async fn bounding_box_centroid_is_used_when_no_point_exists() {
        let queue = MockQueue::new();
        let worker = worker(&queue, MockCityRepo::empty());

        let raw = raw_status(RawStatusOptions {
            bounding_box: Some([
                [-74.0, 40.0],
                [-74.0, 41.0],
                [-73.0, 41.0],
                [-73.0, 40.0],
            ]),
            ..RawStatusOptions::default()
        });
        worker.parse(raw).await;

        let post = popped_post(&queue);
        assert_eq!(post.loc, [-73.5, 40.5]);
    }

    #[tokio::test]
    async fn profile_location_is_resolved_and_stamped() {
        let queue = MockQueue::new();
        let cities = MockCityRepo::with(
            "austin",
            vec![CityRecord {
                name: "austin".into(),
                country: "United States".into(),
                country_code: "US".into(),
                admin1_code: "TX".into(),
                admin1: "Texas".into(),
                population: 790_000,
                location: [-97.74, 30.27],
                ..CityRecord::default()
            }],
        );
        let worker = worker(&queue, cities);

        let raw = raw_status(RawStatusOptions {
            location: Some("Austin, TX"),
            time_zone: Some("Central Time (US & Canada)"),
            ..RawStatusOptions::default()
        });
        worker.parse(raw).await;

        let post = popped_post(&queue);
        assert_eq!(post.loc, [-97.74, 30.27]);
        assert_eq!(post.location_attributes.country, "United States");
        assert_eq!(post.location_attributes.state, "Texas");
        assert_eq!(post.location_attributes.state_code, "US-TX");
    }

    #[tokio::test]
    async fn unresolvable_location_still_flows_downstream() {
        let queue = MockQueue::new();
        let worker = worker(&queue, MockCityRepo::empty());

        let raw = raw_status(RawStatusOptions {
            location: Some("somewhere over the rainbow"),
            ..RawStatusOptions::default()
        });
        worker.parse(raw).await;

        let post = popped_post(&queue);
        assert_eq!(post.loc, [0.0, 0.0]);
        assert!(post.location_attributes.is_empty());
    }

    #[tokio::test]
    async fn reshare_links_the_original_and_inverts_topic_stats() {
        let queue = MockQueue::new();
        let worker = worker(&queue, MockCityRepo::empty());

        let raw = raw_status(RawStatusOptions {
            followers: 50,
            reshare_of: Some(("99", "dave", 9000)),
            ..RawStatusOptions::default()
        });
        worker.parse(raw).await;

        let post = popped_post(&queue);
        assert!(post.is_reshare);
        assert_eq!(post.original_ident.as_deref(), Some("99"));
        assert_eq!(post.original_author.as_deref(), Some("dave"));
        assert_eq!(
            post.original_profile_url.as_deref(),
            Some("http://twitter.com/dave")
        );
        assert_eq!(post.original_reach, Some(9000));
        assert_eq!(post.stats.topic_reach, 0);
        assert_eq!(post.stats.topic_spread, 50);
    }

    #[tokio::test]
    async fn statuses_without_an_author_are_dropped() {
        let queue = MockQueue::new();
        let worker = worker(&queue, MockCityRepo::empty());

        worker
            .parse(
                r#"{"sourceName":"Twitter Filter","data":{"id_str":"1","created_at":"Wed Nov 07 04:01:09 +0000 2012","text":"hi"}}"#
                    .to_string(),
            )
            .await;

        assert!(queue.pushed(ANALYSIS_QUEUE).is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_dropped_without_output() {
        let queue = MockQueue::new();
        let worker = worker(&queue, MockCityRepo::empty());

        worker.parse("{not json".to_string()).await;

        assert!(queue.pushed(ANALYSIS_QUEUE).is_empty());
    }

    #[tokio::test]
    async fn malformed_payloads_surface_as_parse_errors() {
        let queue = MockQueue::new();
        let worker = worker(&queue, MockCityRepo::empty());

        let err = worker.handle("{not json").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<VotePulseError>(),
            Some(VotePulseError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn each_status_is_pushed_exactly_once() {
        // Resolved-location statuses used to be emitted twice upstream of
        // this rewrite; the output must hold exactly one post.
        let queue = MockQueue::new();
        let cities = MockCityRepo::with(
            "austin",
            vec![CityRecord {
                name: "austin".into(),
                country: "United States".into(),
                country_code: "US".into(),
                admin1_code: "TX".into(),
                location: [-97.74, 30.27],
                ..CityRecord::default()
            }],
        );
        let worker = worker(&queue, cities);

        let raw = raw_status(RawStatusOptions {
            location: Some("Austin"),
            ..RawStatusOptions::default()
        });
        worker.parse(raw).await;

        assert_eq!(queue.pushed(ANALYSIS_QUEUE).len(), 1);
    }
}
