//! Store capabilities consumed by the workers: the blocking-queue store
//! (Redis) and the document store (Postgres). All access goes through
//! capability traits so pipeline logic can run against in-memory mocks.

pub mod documents;
pub mod postgres;
pub mod queue;

pub use documents::{ConfigStore, PostStore, WorkerRegistry};
pub use postgres::DocumentStore;
pub use queue::{QueueStore, RedisQueue};

/// Queue fed by the external stream producer, consumed by the parse stage.
pub const PARSE_QUEUE: &str = "queue:twitter:parse";
/// Queue between the parse and analysis stages.
pub const ANALYSIS_QUEUE: &str = "queue:postitems:analysis";
/// Queue between the analysis and stats stages.
pub const STATS_QUEUE: &str = "queue:postitems:stats";

/// Aggregate sorted sets written by the stats stage.
pub const VOTED_STATES_SET: &str = "voted-states";
pub const VOTED_STATE_SET: &str = "voted-state";
pub const VOTED_COUNTRIES_SET: &str = "voted-countries";
pub const VOTING_AUTHORS_SET: &str = "voting-authors";
