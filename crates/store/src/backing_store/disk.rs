use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::backing_store::index::PixelIndex;
use crate::backing_store::{BackingStore, BackingStoreDescriptor};
use crate::color::HexColor;
use crate::error::StoreError;
use crate::id::PixelId;
use crate::types::{Pixel, PixelLoc};

const JOURNAL_FILE: &str = "pixels.journal";
const COMPACTED_FILE: &str = "pixels.journal.tmp";
/// Journals shorter than this are never compacted on open.
const COMPACT_MIN_RECORDS: usize = 1024;

/// Disk-backed storage for the wall.
///
/// Storage strategy:
/// - Every mutation is appended to a journal file as one JSON line and synced before it
///   becomes visible to readers
/// - On open the journal is replayed into an in-memory index which serves all reads
/// - A line cut short by a crash (no trailing newline) is dropped and truncated away
/// - A write or sync that fails is truncated away again, so the journal only ever holds
///   records of mutations that succeeded
/// - When the journal holds many more records than live pixels it is rewritten with one
///   record per pixel
pub struct DiskBackingStore {
    data_dir: PathBuf,
    state: RwLock<DiskState>,
}

struct DiskState {
    index: PixelIndex,
    journal: File,
    records: usize,
    /// Set when a failed append could not be truncated away.
    halted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum JournalRecord {
    Put { pixel: Pixel },
    Delete { id: PixelId },
}

struct Replayed {
    index: PixelIndex,
    records: usize,
    /// Length of the journal prefix made of complete records.
    valid_len: u64,
}

impl DiskBackingStore {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        debug!("Opening disk backing store at {:?}", data_dir);
        fs::create_dir_all(&data_dir)?;

        let path = data_dir.join(JOURNAL_FILE);
        let replayed = Self::replay(&path)?;

        let journal = OpenOptions::new().create(true).append(true).open(&path)?;
        if journal.metadata()?.len() > replayed.valid_len {
            warn!(
                "Dropping incomplete trailing record from {:?} (keeping {} bytes)",
                path, replayed.valid_len
            );
            journal.set_len(replayed.valid_len)?;
        }

        info!(
            "Disk backing store loaded {} pixels from {} journal records",
            replayed.index.len(),
            replayed.records
        );
        let needs_compaction = replayed.records > COMPACT_MIN_RECORDS
            && replayed.records > replayed.index.len() * 2;

        let store = Self {
            data_dir,
            state: RwLock::new(DiskState {
                index: replayed.index,
                journal,
                records: replayed.records,
                halted: false,
            }),
        };
        if needs_compaction {
            store.compact()?;
        }
        Ok(store)
    }

    fn replay(path: &Path) -> Result<Replayed, StoreError> {
        let mut replayed = Replayed {
            index: PixelIndex::default(),
            records: 0,
            valid_len: 0,
        };
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(replayed),
            Err(e) => return Err(e.into()),
        };

        for (number, line) in content.split_inclusive('\n').enumerate() {
            if !line.ends_with('\n') {
                break;
            }
            replayed.valid_len += line.len() as u64;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: JournalRecord =
                serde_json::from_str(line).map_err(|source| StoreError::Corrupt {
                    line: number + 1,
                    source,
                })?;
            match record {
                JournalRecord::Put { pixel } => replayed.index.put(pixel),
                JournalRecord::Delete { id } => {
                    replayed.index.remove(&id);
                }
            }
            replayed.records += 1;
        }
        Ok(replayed)
    }

    /// Rewrites the journal so it holds exactly one record per stored pixel.
    pub fn compact(&self) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let path = self.data_dir.join(JOURNAL_FILE);
        let tmp_path = self.data_dir.join(COMPACTED_FILE);
        debug!(
            "Compacting {:?}: {} records for {} pixels",
            path,
            state.records,
            state.index.len()
        );

        let pixels = state.index.list();
        {
            let mut tmp = File::create(&tmp_path)?;
            for pixel in &pixels {
                let record = JournalRecord::Put {
                    pixel: pixel.clone(),
                };
                tmp.write_all(encode(&record)?.as_bytes())?;
            }
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;

        state.journal = OpenOptions::new().append(true).open(&path)?;
        state.records = pixels.len();
        state.halted = false;
        info!("Journal compacted to {} records", pixels.len());
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DiskState>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DiskState>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

impl DiskState {
    fn append(&mut self, record: &JournalRecord) -> Result<(), StoreError> {
        let line = encode(record)?;
        self.append_with(|journal| {
            journal.write_all(line.as_bytes())?;
            journal.sync_data()
        })
    }

    /// Runs `write` against the journal and cuts the file back to its previous length if it
    /// fails, whether it failed before, during or after putting bytes on disk.
    fn append_with(
        &mut self,
        write: impl FnOnce(&mut File) -> io::Result<()>,
    ) -> Result<(), StoreError> {
        if self.halted {
            return Err(StoreError::Halted);
        }
        let start = self.journal.metadata()?.len();
        if let Err(e) = write(&mut self.journal) {
            warn!("Journal append failed, rolling back to {} bytes: {}", start, e);
            if let Err(rollback) = self
                .journal
                .set_len(start)
                .and_then(|()| self.journal.sync_data())
            {
                error!("Could not roll back journal, halting writes: {}", rollback);
                self.halted = true;
            }
            return Err(e.into());
        }
        self.records += 1;
        Ok(())
    }
}

fn encode(record: &JournalRecord) -> Result<String, StoreError> {
    let mut line = serde_json::to_string(record).map_err(io::Error::from)?;
    line.push('\n');
    Ok(line)
}

impl BackingStore for DiskBackingStore {
    fn describe(&self) -> Result<BackingStoreDescriptor, StoreError> {
        Ok(BackingStoreDescriptor {
            kind: "disk",
            pixels: self.read()?.index.len(),
        })
    }

    fn list(&self) -> Result<Vec<Pixel>, StoreError> {
        Ok(self.read()?.index.list())
    }

    fn find_by_coordinate(&self, x: i64, y: i64) -> Result<Option<Pixel>, StoreError> {
        trace!("Looking for pixel ({}, {}) in disk backing store", x, y);
        Ok(self.read()?.index.by_loc(PixelLoc { x, y }).cloned())
    }

    fn find_by_id(&self, id: &PixelId) -> Result<Option<Pixel>, StoreError> {
        Ok(self.read()?.index.by_id(id).cloned())
    }

    fn create(&self, x: i64, y: i64, color: HexColor) -> Result<Pixel, StoreError> {
        let mut state = self.write()?;
        let pixel = state.index.prepare_create(PixelLoc { x, y }, color)?;
        state.append(&JournalRecord::Put {
            pixel: pixel.clone(),
        })?;
        state.index.put(pixel.clone());
        trace!("Pixel ({}, {}) created as {}", x, y, pixel.id);
        Ok(pixel)
    }

    fn update(&self, id: &PixelId, color: HexColor) -> Result<Pixel, StoreError> {
        let mut state = self.write()?;
        let pixel = state.index.prepare_update(id, color)?;
        state.append(&JournalRecord::Put {
            pixel: pixel.clone(),
        })?;
        state.index.put(pixel.clone());
        trace!("Pixel {} recolored to {}", id, pixel.color);
        Ok(pixel)
    }

    fn delete(&self, id: &PixelId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.index.ensure_exists(id)?;
        state.append(&JournalRecord::Delete { id: id.clone() })?;
        state.index.remove(id);
        trace!("Pixel {} deleted", id);
        Ok(())
    }
}
