//! Block snapshots read from disk.

use anyhow::{Context, Result};
use router_types::Pool;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pool registry state at one block height.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSnapshot {
	pub height: u64,
	pub pools: Vec<Pool>,
}

impl BlockSnapshot {
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read snapshot file: {:?}", path))?;

		serde_json::from_str(&contents)
			.with_context(|| format!("Failed to parse snapshot file: {:?}", path))
	}
}

/// Stand-in block feed: re-reads a snapshot file and yields it only when its
/// height moved past the last one yielded.
pub struct SnapshotFeed {
	path: PathBuf,
	last_height: Option<u64>,
}

impl SnapshotFeed {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			last_height: None,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn last_height(&self) -> Option<u64> {
		self.last_height
	}

	pub fn poll(&mut self) -> Result<Option<BlockSnapshot>> {
		let snapshot = BlockSnapshot::from_file(&self.path)?;

		if let Some(last_height) = self.last_height {
			if snapshot.height <= last_height {
				debug!("Snapshot still at height {}", snapshot.height);
				return Ok(None);
			}
		}

		self.last_height = Some(snapshot.height);
		Ok(Some(snapshot))
	}
}
