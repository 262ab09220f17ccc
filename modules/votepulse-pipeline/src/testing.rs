//! In-memory collaborators and fixtures for pipeline tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use uuid::Uuid;
use votepulse_common::{Post, WorkerInfo};
use votepulse_geo::lookup::CityRepository;
use votepulse_geo::place::CityRecord;
use votepulse_store::{ConfigStore, PostStore, QueueStore, WorkerRegistry};

use crate::ingest::StreamSource;

// --- Queue store ---

#[derive(Default)]
struct QueueState {
    queues: HashMap<String, VecDeque<String>>,
    scores: HashMap<String, HashMap<String, i64>>,
    failing_sets: HashSet<String>,
}

/// In-memory queue store. Blocking pops poll rather than block, which is
/// enough to exercise the consumption loop under test.
#[derive(Clone, Default)]
pub struct MockQueue {
    state: Arc<Mutex<QueueState>>,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `increment_score` fail for one named set.
    pub fn failing_set(self, set: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_sets
            .insert(set.to_string());
        self
    }

    /// Current contents of a queue, oldest first.
    pub fn pushed(&self, queue: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .queues
            .get(queue)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn score(&self, set: &str, member: &str) -> i64 {
        let state = self.state.lock().unwrap();
        state
            .scores
            .get(set)
            .and_then(|s| s.get(member))
            .copied()
            .unwrap_or(0)
    }

    pub fn members(&self, set: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .scores
            .get(set)
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn try_pop(&self, queue: &str) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        state.queues.get_mut(queue).and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl QueueStore for MockQueue {
    async fn push(&self, queue: &str, payload: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .queues
            .entry(queue.to_string())
            .or_default()
            .push_back(payload.to_string());
        Ok(())
    }

    async fn blocking_pop(&self, queue: &str, timeout: Duration) -> Result<Option<String>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(payload) = self.try_pop(queue) {
                return Ok(Some(payload));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    async fn increment_score(&self, set: &str, member: &str, delta: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_sets.contains(set) {
            bail!("zincrby refused for {set}");
        }
        *state
            .scores
            .entry(set.to_string())
            .or_default()
            .entry(member.to_string())
            .or_insert(0) += delta;
        Ok(())
    }

    async fn top_scores(&self, set: &str, count: usize) -> Result<Vec<(String, i64)>> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<(String, i64)> = state
            .scores
            .get(set)
            .map(|s| s.iter().map(|(m, c)| (m.clone(), *c)).collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(count);
        Ok(entries)
    }
}

// --- City repository ---

#[derive(Default)]
struct CityState {
    by_name: HashMap<String, Vec<CityRecord>>,
    nearest: Option<CityRecord>,
    fail_near: bool,
}

#[derive(Clone, Default)]
pub struct MockCityRepo {
    state: Arc<Mutex<CityState>>,
}

impl MockCityRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(name: &str, records: Vec<CityRecord>) -> Self {
        let repo = Self::default();
        repo.state
            .lock()
            .unwrap()
            .by_name
            .insert(name.to_string(), records);
        repo
    }

    /// Fix the record every `find_near` call resolves to.
    pub fn near(self, record: CityRecord) -> Self {
        self.state.lock().unwrap().nearest = Some(record);
        self
    }

    pub fn failing_near(self) -> Self {
        self.state.lock().unwrap().fail_near = true;
        self
    }
}

#[async_trait]
impl CityRepository for MockCityRepo {
    async fn find_by_name(&self, name: &str) -> Result<Vec<CityRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state.by_name.get(name).cloned().unwrap_or_default())
    }

    async fn find_near(&self, _lng: f64, _lat: f64) -> Result<Option<CityRecord>> {
        let state = self.state.lock().unwrap();
        if state.fail_near {
            bail!("nearest-city query refused");
        }
        Ok(state.nearest.clone())
    }
}

// --- Post store ---

#[derive(Clone, Default)]
pub struct MockPostStore {
    saved: Arc<Mutex<Vec<Post>>>,
    fail: bool,
}

impl MockPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<Post> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostStore for MockPostStore {
    async fn upsert(&self, post: &Post) -> Result<()> {
        if self.fail {
            bail!("upsert refused");
        }
        let mut saved = self.saved.lock().unwrap();
        if let Some(existing) = saved.iter_mut().find(|p| p.id == post.id) {
            *existing = post.clone();
        } else {
            saved.push(post.clone());
        }
        Ok(())
    }
}

// --- Worker registry and config store ---

/// In-memory worker registry keeping the latest liveness record per worker.
#[derive(Clone, Default)]
pub struct MockRegistry {
    records: Arc<Mutex<HashMap<Uuid, WorkerInfo>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self, id: Uuid) -> Option<WorkerInfo> {
        self.records.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl WorkerRegistry for MockRegistry {
    async fn upsert_liveness(&self, info: &WorkerInfo) -> Result<()> {
        self.records.lock().unwrap().insert(info.id, info.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockConfigStore {
    docs: Arc<Mutex<HashMap<Uuid, Value>>>,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self, id: Uuid) -> Option<Value> {
        self.docs.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Value>> {
        Ok(self.docs.lock().unwrap().get(&id).cloned())
    }

    async fn save(&self, id: Uuid, doc: &Value) -> Result<()> {
        self.docs.lock().unwrap().insert(id, doc.clone());
        Ok(())
    }
}

// --- Stream source ---

/// Stream source replaying a fixed list of events, then ending.
pub struct ScriptedStream {
    name: String,
    uri: String,
    events: VecDeque<Value>,
    fail_before_events: bool,
    fail_armed: bool,
}

impl ScriptedStream {
    pub fn new(name: &str, uri: &str, events: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            uri: uri.to_string(),
            events: events.into(),
            fail_before_events: false,
            fail_armed: false,
        }
    }

    /// Interleave one read error before every remaining event.
    pub fn with_error_before_each_event(mut self) -> Self {
        self.fail_before_events = true;
        self.fail_armed = true;
        self
    }
}

#[async_trait]
impl StreamSource for ScriptedStream {
    fn name(&self) -> &str {
        &self.name
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    async fn next_event(&mut self) -> Result<Option<Value>> {
        if self.fail_armed && !self.events.is_empty() {
            self.fail_armed = false;
            bail!("synthetic stream error");
        }
        self.fail_armed = self.fail_before_events;
        Ok(self.events.pop_front())
    }
}

// --- Fixtures ---

/// Knobs for [`raw_status`]. Defaults describe a plain unlocated status.
#[derive(Clone)]
pub struct RawStatusOptions<'a> {
    pub id_str: &'a str,
    pub created_at: &'a str,
    pub text: &'a str,
    pub screen_name: &'a str,
    pub followers: i64,
    pub location: Option<&'a str>,
    pub time_zone: Option<&'a str>,
    pub lang: Option<&'a str>,
    /// `(wrapped, expanded)` URL entity pairs.
    pub urls: &'a [(&'a str, &'a str)],
    /// `(wrapped, media)` URL entity pairs.
    pub media: &'a [(&'a str, &'a str)],
    pub mentions: &'a [&'a str],
    /// Native point coordinates, `[lng, lat]`.
    pub point: Option<[f64; 2]>,
    /// Place bounding-box ring corners, `[lng, lat]` each.
    pub bounding_box: Option<[[f64; 2]; 4]>,
    /// `(id_str, screen_name, followers)` of the retweeted original.
    pub reshare_of: Option<(&'a str, &'a str, i64)>,
}

impl Default for RawStatusOptions<'_> {
    fn default() -> Self {
        Self {
            id_str: "261021765414748161",
            created_at: "Wed Nov 07 04:01:09 +0000 2012",
            text: "I just #voted",
            screen_name: "alice",
            followers: 10,
            location: None,
            time_zone: None,
            lang: Some("en"),
            urls: &[],
            media: &[],
            mentions: &[],
            point: None,
            bounding_box: None,
            reshare_of: None,
        }
    }
}

/// Serialized stream envelope holding one raw Twitter status.
pub fn raw_status(options: RawStatusOptions<'_>) -> String {
    let mut user = json!({
        "screen_name": options.screen_name,
        "name": "Alice Example",
        "description": "Casting ballots since 2008",
        "followers_count": options.followers,
    });
    if let Some(location) = options.location {
        user["location"] = json!(location);
    }
    if let Some(time_zone) = options.time_zone {
        user["time_zone"] = json!(time_zone);
    }
    if let Some(lang) = options.lang {
        user["lang"] = json!(lang);
    }

    let entities = json!({
        "urls": options
            .urls
            .iter()
            .map(|(url, expanded)| json!({"url": url, "expanded_url": expanded}))
            .collect::<Vec<_>>(),
        "user_mentions": options
            .mentions
            .iter()
            .map(|name| json!({"screen_name": name}))
            .collect::<Vec<_>>(),
        "media": options
            .media
            .iter()
            .map(|(url, media_url)| json!({"url": url, "media_url": media_url}))
            .collect::<Vec<_>>(),
    });

    let mut status = json!({
        "id_str": options.id_str,
        "created_at": options.created_at,
        "text": options.text,
        "user": user,
        "entities": entities,
    });
    if let Some(point) = options.point {
        status["coordinates"] = json!({"type": "Point", "coordinates": point});
    }
    if let Some(corners) = options.bounding_box {
        status["place"] = json!({
            "bounding_box": {"type": "Polygon", "coordinates": [corners]},
        });
    }
    if let Some((id_str, author, followers)) = options.reshare_of {
        status["retweeted_status"] = json!({
            "id_str": id_str,
            "created_at": "Tue Nov 06 22:10:00 +0000 2012",
            "text": "original",
            "user": {"screen_name": author, "followers_count": followers},
        });
    }

    json!({
        "sourceName": "Twitter Filter",
        "sourceUri": "https://stream.twitter.com/1/statuses/filter.json",
        "data": status,
    })
    .to_string()
}
