//! Durable append-only log backend.
//!
//! Each partition is one file under the store directory, named after the
//! partition's table (`public_grids.log`, `secret_grids.log`). Files hold
//! a sequence of frames:
//!
//! ```text
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (JSON-encoded GridDocument)]
//! ```
//!
//! On open the file is scanned front-to-back to rebuild an in-memory
//! `id -> offset` index. Reads seek to the indexed offset; the document
//! body itself stays on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gridshare_types::{GridDocument, GridId, NewGrid, Visibility};

use crate::error::{StoreError, StoreResult};
use crate::traits::{random_index, GridStore};

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: u64 = 8;

/// Largest payload a frame may carry.
const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

/// Flush/sync strategy for log appends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// `fsync` after every insert. An insert that returned survives a crash.
    #[default]
    EveryWrite,
    /// Flush to the OS but let it decide when to reach disk.
    OsDefault,
}

/// Where a document lives in its log.
#[derive(Clone, Copy, Debug)]
struct IndexEntry {
    id: GridId,
    offset: u64,
}

struct LogWriter {
    writer: BufWriter<File>,
    /// Current end of valid data.
    offset: u64,
    next_id: GridId,
}

/// One partition's log file plus its index.
struct PartitionLog {
    visibility: Visibility,
    path: PathBuf,
    sync_mode: SyncMode,
    writer: Mutex<LogWriter>,
    reader: Mutex<File>,
    /// Sorted by id.
    index: RwLock<Vec<IndexEntry>>,
}

impl PartitionLog {
    fn open(dir: &Path, visibility: Visibility, sync_mode: SyncMode) -> StoreResult<Self> {
        let path = dir.join(format!("{}.log", visibility.table_name()));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let recovered = recover(&path, visibility)?;
        if recovered.valid_end < file.metadata()?.len() {
            warn!(
                partition = %visibility,
                valid_end = recovered.valid_end,
                "truncating torn tail of grid log"
            );
            file.set_len(recovered.valid_end)?;
        }

        let highest = recovered
            .index
            .last()
            .map_or(0, |entry| entry.id.get())
            .max(recovered.frames);
        let next_id = GridId::new(highest + 1).unwrap_or(GridId::FIRST);
        info!(
            partition = %visibility,
            rows = recovered.index.len(),
            next_id = %next_id,
            "grid log opened"
        );

        Ok(Self {
            visibility,
            reader: Mutex::new(File::open(&path)?),
            path,
            sync_mode,
            writer: Mutex::new(LogWriter {
                writer: BufWriter::new(file),
                offset: recovered.valid_end,
                next_id,
            }),
            index: RwLock::new(recovered.index),
        })
    }

    fn append(&self, grid: &NewGrid) -> StoreResult<GridId> {
        let mut w = self.writer.lock().map_err(poisoned)?;
        let id = w.next_id;
        let document = grid.clone().into_document(id, Utc::now());
        let payload = serde_json::to_vec(&document)?;
        let length = u32::try_from(payload.len())
            .ok()
            .filter(|&len| len <= MAX_FRAME_LEN)
            .ok_or_else(|| {
                StoreError::Serialization(format!("document too large: {} bytes", payload.len()))
            })?;
        let offset = w.offset;

        if let Err(e) = write_frame(&mut w.writer, &payload, length, self.sync_mode) {
            self.rewind(&mut w)?;
            return Err(e.into());
        }

        w.offset += HEADER_SIZE + payload.len() as u64;
        w.next_id = id.next();
        // Still under the writer lock, so the index stays sorted.
        self.index
            .write()
            .map_err(poisoned)?
            .push(IndexEntry { id, offset });

        debug!(%id, partition = %self.visibility, offset, len = payload.len(), "grid stored");
        Ok(id)
    }

    /// Drop a partially written frame so the next append starts clean.
    fn rewind(&self, w: &mut LogWriter) -> StoreResult<()> {
        let file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        file.set_len(w.offset)?;
        let stale = std::mem::replace(&mut w.writer, BufWriter::new(file));
        // Discard buffered bytes instead of flushing them on drop.
        let _ = stale.into_parts();
        warn!(partition = %self.visibility, offset = w.offset, "rolled back failed grid append");
        Ok(())
    }

    fn read(&self, id: GridId) -> StoreResult<Option<GridDocument>> {
        let entry = {
            let index = self.index.read().map_err(poisoned)?;
            match index.binary_search_by_key(&id, |entry| entry.id) {
                Ok(pos) => index[pos],
                Err(_) => return Ok(None),
            }
        };

        let mut file = self.reader.lock().map_err(poisoned)?;
        file.seek(SeekFrom::Start(entry.offset))?;
        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;
        let (length, expected_crc) = parse_header(&header);
        let mut payload = vec![0u8; length as usize];
        file.read_exact(&mut payload)?;
        drop(file);

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            return Err(StoreError::CorruptFrame {
                partition: self.visibility,
                offset: entry.offset,
                reason: format!("CRC mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"),
            });
        }
        let document: GridDocument =
            serde_json::from_slice(&payload).map_err(|e| StoreError::CorruptFrame {
                partition: self.visibility,
                offset: entry.offset,
                reason: e.to_string(),
            })?;
        Ok(Some(document))
    }

    fn random_id(&self) -> StoreResult<GridId> {
        let index = self.index.read().map_err(poisoned)?;
        random_index(index.len())
            .map(|pos| index[pos].id)
            .ok_or(StoreError::EmptyPartition(self.visibility))
    }

    fn len(&self) -> StoreResult<u64> {
        Ok(self.index.read().map_err(poisoned)?.len() as u64)
    }
}

fn write_frame(
    writer: &mut BufWriter<File>,
    payload: &[u8],
    length: u32,
    sync_mode: SyncMode,
) -> io::Result<()> {
    writer.write_all(&length.to_le_bytes())?;
    writer.write_all(&crc32fast::hash(payload).to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    if sync_mode == SyncMode::EveryWrite {
        writer.get_ref().sync_data()?;
    }
    Ok(())
}

fn parse_header(header: &[u8; HEADER_SIZE as usize]) -> (u32, u32) {
    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    (length, crc)
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

struct Recovered {
    index: Vec<IndexEntry>,
    /// Offset just past the last complete frame.
    valid_end: u64,
    /// Complete frames in the log, readable or not. Ids are dense, so this
    /// is also the highest id ever handed out.
    frames: u64,
}

/// Scan a log and rebuild its index.
///
/// Only the final frame may be incomplete: a header cut short, or a
/// plausible length whose payload runs past the end of the file. That is a
/// torn write and the scan stops before it. Any other impossible length
/// means the log itself is damaged and opening fails.
///
/// Complete frames that fail the CRC or do not decode are skipped but still
/// counted, so their ids are never handed out again.
fn recover(path: &Path, visibility: Visibility) -> StoreResult<Recovered> {
    let mut file = BufReader::new(File::open(path)?);
    let file_len = file.get_ref().metadata()?.len();
    let mut index: Vec<IndexEntry> = Vec::new();
    let mut frames: u64 = 0;
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE <= file_len {
        file.seek(SeekFrom::Start(offset))?;
        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;
        let (length, expected_crc) = parse_header(&header);

        if length == 0 || length > MAX_FRAME_LEN {
            return Err(StoreError::CorruptFrame {
                partition: visibility,
                offset,
                reason: format!("impossible frame length {length}"),
            });
        }
        let next = offset + HEADER_SIZE + u64::from(length);
        if next > file_len {
            let mut tail = Vec::new();
            file.seek(SeekFrom::Start(offset + 1))?;
            file.read_to_end(&mut tail)?;
            if holds_intact_frame(&tail) {
                return Err(StoreError::CorruptFrame {
                    partition: visibility,
                    offset,
                    reason: format!("frame length {length} overruns intact frames"),
                });
            }
            warn!(partition = %visibility, offset, length, file_len, "torn final frame");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        file.read_exact(&mut payload)?;
        frames += 1;

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(partition = %visibility, offset, expected = expected_crc, actual = actual_crc, "CRC mismatch; skipping frame");
            offset = next;
            continue;
        }

        match serde_json::from_slice::<GridDocument>(&payload) {
            Ok(doc) if index.last().map_or(true, |last| doc.id > last.id) => {
                index.push(IndexEntry { id: doc.id, offset });
            }
            Ok(doc) => {
                warn!(partition = %visibility, offset, id = %doc.id, "non-increasing id; skipping frame");
            }
            Err(e) => {
                warn!(partition = %visibility, offset, error = %e, "undecodable frame; skipping");
            }
        }
        offset = next;
    }

    debug!(partition = %visibility, recovered = index.len(), frames, "grid log recovery complete");
    Ok(Recovered {
        index,
        valid_end: offset,
        frames,
    })
}

/// Whether `tail` contains a complete frame with a valid CRC.
fn holds_intact_frame(tail: &[u8]) -> bool {
    // Every payload is a serialized GridDocument, which starts with its id.
    const PAYLOAD_START: &[u8] = b"{\"id\":";
    let header_len = HEADER_SIZE as usize;
    (0..tail.len()).any(|at| {
        let Some(header) = tail.get(at..at + header_len) else {
            return false;
        };
        let Ok(header) = <&[u8; HEADER_SIZE as usize]>::try_from(header) else {
            return false;
        };
        let (length, crc) = parse_header(header);
        let start = at + header_len;
        start
            .checked_add(length as usize)
            .and_then(|end| tail.get(start..end))
            .is_some_and(|payload| {
                payload.starts_with(PAYLOAD_START) && crc32fast::hash(payload) == crc
            })
    })
}

/// Grid store persisted as one append-only log per partition.
pub struct LogGridStore {
    dir: PathBuf,
    public: PartitionLog,
    secret: PartitionLog,
}

impl LogGridStore {
    /// Open (or create) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>, sync_mode: SyncMode) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            public: PartitionLog::open(dir, Visibility::Public, sync_mode)?,
            secret: PartitionLog::open(dir, Visibility::Secret, sync_mode)?,
        })
    }

    /// Path of a partition's log file.
    pub fn log_path(&self, visibility: Visibility) -> &Path {
        &self.partition(visibility).path
    }

    fn partition(&self, visibility: Visibility) -> &PartitionLog {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Secret => &self.secret,
        }
    }
}

impl GridStore for LogGridStore {
    fn insert(&self, grid: &NewGrid) -> StoreResult<GridId> {
        self.partition(grid.visibility).append(grid)
    }

    fn get_by_id(&self, visibility: Visibility, id: GridId) -> StoreResult<Option<GridDocument>> {
        self.partition(visibility).read(id)
    }

    fn random_public_id(&self) -> StoreResult<GridId> {
        self.public.random_id()
    }

    fn count(&self, visibility: Visibility) -> StoreResult<u64> {
        self.partition(visibility).len()
    }
}

impl std::fmt::Debug for LogGridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGridStore")
            .field("dir", &self.dir)
            .field("public", &self.public.len().unwrap_or_default())
            .field("secret", &self.secret.len().unwrap_or_default())
            .finish()
    }
}
