use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::models::HistoryRecord;

pub const LEDGER_HEADERS: [&str; 4] = ["date", "title", "sentiment", "link"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access ledger {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "ledger {} has columns {found:?}, expected date,title,sentiment,link",
        path.display()
    )]
    Schema { path: PathBuf, found: Vec<String> },
    #[error("ledger {} contains an unreadable row: {source}", path.display())]
    Row {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Append-only ledger of dated article records backed by a CSV file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty ledger with the canonical header. Returns `false` when
    /// a ledger already exists, leaving it untouched.
    pub fn initialize(&self) -> Result<bool, StorageError> {
        if self.has_content()? {
            debug!(path = %self.path.display(), "ledger already initialized");
            return Ok(false);
        }

        self.write_all(&[])?;
        info!(path = %self.path.display(), "created empty ledger");
        Ok(true)
    }

    /// Returns every record in storage order. A missing or zero-byte file is an
    /// empty ledger; anything else must match the canonical schema.
    pub fn load(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        if !self.has_content()? {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|source| StorageError::Row {
            path: self.path.clone(),
            source,
        })?;

        let headers = reader.headers().map_err(|source| StorageError::Row {
            path: self.path.clone(),
            source,
        })?;
        if !headers.iter().eq(LEDGER_HEADERS) {
            return Err(StorageError::Schema {
                path: self.path.clone(),
                found: headers.iter().map(str::to_string).collect(),
            });
        }

        let mut records = Vec::new();
        for result in reader.deserialize::<HistoryRecord>() {
            let record = result.map_err(|source| StorageError::Row {
                path: self.path.clone(),
                source,
            })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Loads the ledger, concatenates `records` in the order given and swaps
    /// the result into place. Returns the new ledger length.
    pub fn append(&self, records: &[HistoryRecord]) -> Result<usize, StorageError> {
        let mut ledger = self.load()?;
        ledger.extend_from_slice(records);
        self.write_all(&ledger)?;

        info!(
            path = %self.path.display(),
            appended = records.len(),
            total = ledger.len(),
            "ledger updated"
        );
        Ok(ledger.len())
    }

    fn has_content(&self) -> Result<bool, StorageError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() > 0),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_all(&self, ledger: &[HistoryRecord]) -> Result<(), StorageError> {
        let io_error = |source: io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        let row_error = |source: csv::Error| StorageError::Row {
            path: self.path.clone(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(LEDGER_HEADERS).map_err(row_error)?;
        for record in ledger {
            writer.serialize(record).map_err(row_error)?;
        }
        let contents = writer
            .into_inner()
            .map_err(|err| io_error(err.into_error()))?;

        persist_atomically(&self.path, &contents).map_err(io_error)
    }
}

/// Writes `contents` to a sibling temp file, syncs it, then renames it over
/// `path` so readers never observe a partially written artifact.
pub fn persist_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    file_name.push(".tmp");
    let tmp_path = path.with_file_name(file_name);

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)
}
