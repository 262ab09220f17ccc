use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MS_PER_HOUR: i64 = 3_600_000;
pub const MS_PER_DAY: i64 = 86_400_000;

/// Floor a millisecond timestamp to the start of its hour.
pub fn hour_bucket(time_ms: i64) -> i64 {
    time_ms / MS_PER_HOUR * MS_PER_HOUR
}

/// Floor a millisecond timestamp to the start of its day.
pub fn day_bucket(time_ms: i64) -> i64 {
    time_ms / MS_PER_DAY * MS_PER_DAY
}

// --- Post ---

/// Profile-level attributes captured from the author of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bio: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// Raw free-text location string from the profile. Input to geolocation.
    pub location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub profile_image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

/// Resolved geographic attribution, populated progressively across pipeline
/// stages. Fields are append-only: a later stage must never overwrite a
/// non-empty value set by an earlier stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LocationAttributes {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state_code: String,
}

impl LocationAttributes {
    pub fn is_empty(&self) -> bool {
        self.country.is_empty() && self.state.is_empty() && self.state_code.is_empty()
    }
}

/// Reshare-aware engagement counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PostStats {
    pub reach: i64,
    pub spread: i64,
    pub topic_reach: i64,
    pub topic_spread: i64,
}

/// The unit flowing through the pipeline: constructed by the parse stage,
/// enriched by analysis, persisted (and counted) by stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub ident: String,
    pub time_ms: i64,
    pub hour_ms: i64,
    pub day_ms: i64,
    pub aggregated_ms: i64,
    pub text: String,
    pub source_name: String,
    pub source_uri: String,
    pub author: String,
    pub profile_url: String,
    pub lang: String,
    pub network: String,
    pub user_attributes: UserAttributes,
    pub location_attributes: LocationAttributes,
    /// Longitude, latitude. `[0, 0]` means unresolved, never a real coordinate.
    pub loc: [f64; 2],
    pub urls: Vec<String>,
    pub mentions: Vec<String>,
    pub is_reshare: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_ident: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_time_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_reach: Option<i64>,
    pub stats: PostStats,
}

impl Post {
    /// Whether the post carries a real coordinate (anything but the
    /// `[0, 0]` "unresolved" sentinel).
    pub fn has_coordinates(&self) -> bool {
        self.loc != [0.0, 0.0]
    }
}

// --- Worker liveness ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerStatus {
    Running,
    Stopped,
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerStatus::Running => write!(f, "Running"),
            WorkerStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Liveness record upserted by worker id into the shared worker registry.
/// External monitoring watches `LastPingMs` to detect stalled workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkerInfo {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub status: WorkerStatus,
    pub is_stopped: bool,
    pub start_time_ms: i64,
    /// 0 while the worker is running.
    pub stop_time_ms: i64,
    pub last_ping_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_keys_floor_to_interval_start() {
        // 2020-11-03T14:35:00Z
        let t = 1_604_414_100_000i64;
        assert_eq!(hour_bucket(t) % MS_PER_HOUR, 0);
        assert_eq!(day_bucket(t) % MS_PER_DAY, 0);
        assert!(hour_bucket(t) <= t && t - hour_bucket(t) < MS_PER_HOUR);
        assert!(day_bucket(t) <= t && t - day_bucket(t) < MS_PER_DAY);
    }

    #[test]
    fn post_round_trips_with_pascal_case_wire_names() {
        let post = Post {
            id: "tw:123".into(),
            ident: "123".into(),
            time_ms: 1_604_414_100_000,
            author: "voter".into(),
            loc: [-73.97, 40.78],
            ..Default::default()
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["_id"], "tw:123");
        assert_eq!(json["Ident"], "123");
        assert_eq!(json["TimeMs"], 1_604_414_100_000i64);
        assert_eq!(json["Loc"][1], 40.78);

        let back: Post = serde_json::from_value(json).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn empty_optional_strings_are_omitted_from_the_wire() {
        let post = Post::default();
        let json = serde_json::to_value(&post).unwrap();
        assert!(json["UserAttributes"].get("Bio").is_none());
        assert!(json["LocationAttributes"].get("Country").is_none());
        // Location is always present, even when empty
        assert_eq!(json["UserAttributes"]["Location"], "");
    }

    #[test]
    fn unresolved_sentinel_is_not_a_coordinate() {
        let mut post = Post::default();
        assert!(!post.has_coordinates());
        post.loc = [0.0, 51.5];
        assert!(post.has_coordinates());
    }
}
