//! External action ledger.
//!
//! Optional collaborator notified after each resolved event, best-effort
//! and fire-and-forget: a slow or broken sink must never block or fail a
//! tick. The JSONL sink disables itself after its first write error and
//! only warns.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use agora_events::{ActionKind, Event};

/// Receives resolved events, best-effort.
pub trait LedgerSink: Send {
    fn record(&mut self, event: &Event);
}

/// Sink that discards everything (ledger disabled).
pub struct NullLedger;

impl LedgerSink for NullLedger {
    fn record(&mut self, _event: &Event) {}
}

/// Condensed receipt written per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub event_id: String,
    pub time: u64,
    pub agent_id: String,
    pub kind: ActionKind,
    pub success: bool,
}

impl LedgerEntry {
    pub fn from_event(event: &Event) -> Self {
        Self {
            event_id: event.event_id.clone(),
            time: event.time,
            agent_id: event.agent_id().to_string(),
            kind: event.action.kind(),
            success: event.outcome.success,
        }
    }
}

/// Appends one receipt per event to a JSONL file.
pub struct JsonlLedger {
    writer: Option<BufWriter<File>>,
    recorded: u64,
}

impl JsonlLedger {
    /// Creates the ledger file, truncating any previous run.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            recorded: 0,
        })
    }

    /// How many receipts reached the file.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    fn try_record(&mut self, event: &Event) -> std::io::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            let entry = LedgerEntry::from_event(event);
            let json = serde_json::to_string(&entry)?;
            writeln!(writer, "{}", json)?;
            self.recorded += 1;
        }
        Ok(())
    }
}

impl LedgerSink for JsonlLedger {
    fn record(&mut self, event: &Event) {
        if let Err(err) = self.try_record(event) {
            tracing::warn!(%err, "ledger write failed, disabling sink");
            self.writer = None;
        }
    }
}

impl Drop for JsonlLedger {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_events::fixtures;
    use std::io::BufRead;

    #[test]
    fn test_null_ledger_accepts_everything() {
        let mut ledger = NullLedger;
        ledger.record(&fixtures::filled_buy_event(1, "agent_0001", 5.0, 1));
    }

    #[test]
    fn test_jsonl_ledger_writes_receipts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let mut ledger = JsonlLedger::create(&path).unwrap();
        ledger.record(&fixtures::filled_buy_event(1, "agent_0001", 5.0, 1));
        ledger.record(&fixtures::unknown_kind_event(2, "agent_0002", 2));
        assert_eq!(ledger.recorded(), 2);
        drop(ledger);

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let first: LedgerEntry = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first.event_id, "evt_00000001");
        assert_eq!(first.kind, ActionKind::Trade);
        assert!(first.success);

        let second: LedgerEntry = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second.kind, ActionKind::Unknown);
        assert!(!second.success);
    }
}
