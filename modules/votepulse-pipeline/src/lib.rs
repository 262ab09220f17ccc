//! The four VotePulse pipeline stages.
//!
//! Posts flow through three Redis lists, each drained by its own worker
//! process:
//!
//! ```text
//! ingest -> queue:twitter:parse -> parse -> queue:postitems:analysis
//!        -> analysis -> queue:postitems:stats -> stats
//! ```
//!
//! Ingest reads raw events from a stream source and enqueues them verbatim.
//! Parse normalizes raw Twitter statuses into [`votepulse_common::types::Post`]
//! documents and resolves free-text profile locations to coordinates.
//! Analysis back-fills region attributes for posts that carry native
//! coordinates. Stats persists the finished post and bumps the regional
//! vote tallies.

pub mod analysis;
pub mod ingest;
pub mod parse;
pub mod stats;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
