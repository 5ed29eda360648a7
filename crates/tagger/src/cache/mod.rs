//! Tag caches kept by the owning thread.
//!
//! [`BackgroundCache`] holds authoritative results for one snapshot. When the
//! document moves on it is folded into a [`TrackingCache`], whose entries are
//! projected forward so stale-but-close tags can be served until fresh results
//! arrive.

mod background;
mod tracking;

pub use background::BackgroundCache;
pub use tracking::TrackingCache;

/// How much of a query a [`BackgroundCache`] can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
	/// Nothing cached for the queried lines.
	None,
	/// Some queried lines are cached.
	Partial,
	/// Every queried line is cached.
	Complete,
}

#[cfg(test)]
mod tests;
