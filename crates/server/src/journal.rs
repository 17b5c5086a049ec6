//! Persistent store writes.
//!
//! The manager never talks to a database directly. Every change that must
//! survive a restart is expressed as a [`StoreWrite`] and handed to a
//! [`WriteSink`].

use crate::error::DataError;
use common::{BotId, BotSlot, FactionId, ItemId, PlayerId, BOT_INVENTORY_SIZE};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// One point update against the bot tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreWrite {
    InsertBot {
        entry: BotId,
        roles: u32,
        spec: u8,
        faction: FactionId,
    },
    UpdateOwner {
        entry: BotId,
        owner: Option<PlayerId>,
    },
    UpdateOwnerAll {
        from: PlayerId,
        to: Option<PlayerId>,
    },
    EraseTransmogs {
        entry: BotId,
    },
    EraseTransmogsByOwner {
        owner: PlayerId,
    },
    UpdateRoles {
        entry: BotId,
        roles: u32,
    },
    UpdateSpec {
        entry: BotId,
        spec: u8,
    },
    UpdateFaction {
        entry: BotId,
        faction: FactionId,
    },
    UpdateDisabledAbilities {
        entry: BotId,
        abilities: String,
    },
    /// Item instance upserts and slot columns, applied as one transaction.
    UpdateEquipment {
        entry: BotId,
        items: Vec<(BotSlot, ItemId)>,
        slots: [ItemId; BOT_INVENTORY_SIZE],
    },
    DeleteBot {
        entry: BotId,
    },
    /// Replaces every transmog row of an entry, applied as one transaction.
    ReplaceTransmogs {
        entry: BotId,
        slots: Vec<(BotSlot, ItemId, ItemId)>,
    },
    SetNextGeneratedId {
        id: BotId,
    },
}

/// Destination for store writes.
pub trait WriteSink {
    fn submit(&mut self, write: StoreWrite) -> Result<(), DataError>;
}

/// In-memory journal. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    writes: Arc<Mutex<Vec<StoreWrite>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every write submitted so far.
    pub fn writes(&self) -> Vec<StoreWrite> {
        self.writes.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.lock().is_empty()
    }

    pub fn clear(&self) {
        self.writes.lock().clear();
    }
}

impl WriteSink for MemoryJournal {
    fn submit(&mut self, write: StoreWrite) -> Result<(), DataError> {
        self.writes.lock().push(write);
        Ok(())
    }
}

/// Append-only JSON lines file.
#[derive(Debug)]
pub struct JournalFile {
    writer: BufWriter<File>,
}

impl JournalFile {
    pub fn open(path: &Path) -> Result<Self, DataError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl WriteSink for JournalFile {
    fn submit(&mut self, write: StoreWrite) -> Result<(), DataError> {
        serde_json::to_writer(&mut self.writer, &write)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_journal_shares_buffer() {
        let journal = MemoryJournal::new();
        let mut sink: Box<dyn WriteSink + Send> = Box::new(journal.clone());
        sink.submit(StoreWrite::DeleteBot { entry: 70001 }).unwrap();
        assert_eq!(journal.writes(), vec![StoreWrite::DeleteBot { entry: 70001 }]);
    }

    #[test]
    fn test_write_encodes_as_tagged_json() {
        let line = serde_json::to_string(&StoreWrite::UpdateSpec { entry: 5, spec: 3 }).unwrap();
        assert_eq!(line, r#"{"op":"update_spec","entry":5,"spec":3}"#);
    }
}
