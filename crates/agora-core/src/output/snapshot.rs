//! Snapshot Writing
//!
//! Persists world snapshots at regular tick intervals.

use std::fs;
use std::path::{Path, PathBuf};

use agora_events::WorldSnapshot;

use crate::error::OutputError;

/// Writes world snapshots into a directory, one JSON file each.
pub struct SnapshotWriter {
    dir: PathBuf,
    snapshot_interval: u64,
}

impl SnapshotWriter {
    /// Creates the snapshot directory if needed.
    pub fn new(dir: impl AsRef<Path>, snapshot_interval: u64) -> Result<Self, OutputError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| OutputError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            snapshot_interval,
        })
    }

    /// Whether the given tick is on the snapshot cadence.
    pub fn should_snapshot(&self, tick: u64) -> bool {
        tick == 0 || (self.snapshot_interval > 0 && tick % self.snapshot_interval == 0)
    }

    /// Writes one snapshot, named after its id.
    pub fn write(&self, snapshot: &WorldSnapshot) -> Result<PathBuf, OutputError> {
        let path = self.dir.join(format!("{}.json", snapshot.snapshot_id));
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json).map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_events::{generate_snapshot_id, MarketSnapshot};

    fn sample_snapshot(time: u64) -> WorldSnapshot {
        WorldSnapshot {
            snapshot_id: generate_snapshot_id(time),
            world_id: "deadbeef".to_string(),
            world_name: "test".to_string(),
            time,
            market: MarketSnapshot {
                market_price: 100.0,
                volatility: 0.1,
                resources: 1000,
                total_volume: 0.0,
            },
            agents: Vec::new(),
            event_count: 0,
            recent_events: Vec::new(),
        }
    }

    #[test]
    fn test_snapshot_cadence() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 100).unwrap();

        assert!(writer.should_snapshot(0));
        assert!(!writer.should_snapshot(50));
        assert!(writer.should_snapshot(100));
        assert!(writer.should_snapshot(200));
    }

    #[test]
    fn test_zero_interval_only_snapshots_initial_state() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 0).unwrap();

        assert!(writer.should_snapshot(0));
        assert!(!writer.should_snapshot(1));
    }

    #[test]
    fn test_write_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("snapshots"), 10).unwrap();

        let snapshot = sample_snapshot(10);
        let path = writer.write(&snapshot).unwrap();
        assert!(path.ends_with("snap_000010.json"));

        let json = fs::read_to_string(&path).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
