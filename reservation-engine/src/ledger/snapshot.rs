//! Disk snapshots of the in-memory ledger.
//!
//! Serializes the whole ledger state to a JSON file so a deployment can
//! survive restarts. Snapshots are written by this module only, so the
//! load path treats the file as trusted apart from basic validation
//! done by the domain types' deserializers.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::domain::{Booking, Occupancy};

use super::memory::LedgerState;
use super::{InMemoryLedger, LedgerError};

/// On-disk snapshot format.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    /// Unix timestamp when the snapshot was written.
    saved_at_secs: u64,
    /// Booking counter, so restored ledgers keep issuing fresh locators.
    next_booking: u64,
    /// Occupancy counter, so restored ledgers keep queue order intact.
    next_occupancy: u64,
    bookings: Vec<Booking>,
    occupancies: Vec<Occupancy>,
}

/// Reads and writes ledger snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    path: PathBuf,
}

impl LedgerSnapshot {
    /// Create a snapshot handle for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to load a ledger from the snapshot.
    ///
    /// Returns `None` if the file doesn't exist or can't be parsed.
    pub fn load(&self) -> Option<InMemoryLedger> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let file: SnapshotFile = serde_json::from_str(&contents).ok()?;

        let ledger = InMemoryLedger::new();
        ledger.with_state(|state| {
            state.next_booking = file.next_booking;
            state.next_occupancy = file.next_occupancy;
            state.bookings = file
                .bookings
                .iter()
                .map(|b| (b.locator, b.clone()))
                .collect();
            state.occupancies = file.occupancies.iter().map(|o| (o.id, o.clone())).collect();
        });
        Some(ledger)
    }

    /// Write the ledger state to the snapshot file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, ledger: &InMemoryLedger) -> Result<(), LedgerError> {
        let saved_at_secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| LedgerError::Storage("system time before unix epoch".to_string()))?
            .as_secs();

        let file = ledger.with_state(|state: &mut LedgerState| SnapshotFile {
            saved_at_secs,
            next_booking: state.next_booking,
            next_occupancy: state.next_occupancy,
            bookings: state.bookings.values().cloned().collect(),
            occupancies: state.occupancies.values().cloned().collect(),
        });

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                LedgerError::Storage(format!("failed to create snapshot directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| LedgerError::Storage(format!("failed to serialize snapshot: {}", e)))?;

        std::fs::write(&self.path, json)
            .map_err(|e| LedgerError::Storage(format!("failed to write snapshot: {}", e)))?;

        Ok(())
    }
}
