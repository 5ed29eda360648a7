use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Default number of lines computed per producer call.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid tagger config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Tuning knobs for [`crate::AsyncTagger`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaggerCfg {
	/// Lines per producer call. Zero is treated as one.
	pub chunk_size: usize,
	/// Startup delay for background requests, overriding the producer's.
	#[serde(rename = "delay_ms", deserialize_with = "delay_from_ms")]
	pub delay: Option<Duration>,
}

impl Default for TaggerCfg {
	fn default() -> Self {
		Self {
			chunk_size: DEFAULT_CHUNK_SIZE,
			delay: None,
		}
	}
}

impl TaggerCfg {
	/// Parses a flat TOML table such as `chunk_size = 200`.
	pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str::<Self>(src)?.normalized())
	}

	pub(crate) fn normalized(mut self) -> Self {
		self.chunk_size = self.chunk_size.max(1);
		self
	}
}

fn delay_from_ms<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Duration>, D::Error> {
	Ok(Option::<u64>::deserialize(de)?.map(Duration::from_millis))
}
