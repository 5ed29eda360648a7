//! Asynchronous incremental tagging.
//!
//! [`AsyncTagger`] answers tag queries for a versioned document without
//! blocking. Missing lines are computed in chunks on a background worker
//! that always serves the visible range first; results computed for an older
//! snapshot keep being served, projected through later edits, until fresh
//! results replace them.

mod cache;
mod channel;
mod config;
mod engine;
mod metrics;
mod msg;
mod producer;
mod request;
mod visited;
mod worker;

pub use cache::{BackgroundCache, CacheState, TrackingCache};
pub use channel::PriorityChannel;
pub use config::{ConfigError, DEFAULT_CHUNK_SIZE, TaggerCfg};
pub use engine::AsyncTagger;
pub use metrics::TaggerMetrics;
pub use msg::{CompletionReason, TaggerNotifier, TagsChanged};
pub use producer::{ProducerError, TagProducer, TagSpan};
pub use visited::VisitedRangeSet;
pub use weft_worker::CancellationToken;
