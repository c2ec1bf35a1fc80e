//! Local book library.
//!
//! A filesystem key-value store standing in for the browser's object store:
//! each book gets a TOML record plus a copied blob under `.cache/library/`.
//! Blob filenames carry a hash of the book name to avoid filesystem issues
//! with arbitrary titles. Storage failures abandon the operation without
//! leaving partial records behind.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

pub const LIBRARY_DIR: &str = ".cache/library";

/// One book in the personal library.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BookRecord {
    pub id: u64,
    pub name: String,
    /// Path of the stored blob inside the library directory.
    pub path: PathBuf,
    pub added_unix_secs: u64,
}

/// Filesystem-backed store exposing add / list / get / delete.
pub struct LibraryStore {
    root: PathBuf,
}

impl LibraryStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create library dir {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(LIBRARY_DIR)
    }

    /// Copy `source` into the store and write its record. The blob is
    /// written before the record so a failed copy leaves no dangling entry.
    pub fn add(&self, source: &Path) -> Result<BookRecord> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Book file has no usable name: {}", source.display()))?
            .to_string();
        let id = self.next_id()?;
        let added_unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let blob_path = self.root.join(blob_filename(id, &name));
        fs::copy(source, &blob_path)
            .with_context(|| format!("Failed to copy {} into the library", source.display()))?;

        let record = BookRecord {
            id,
            name,
            path: blob_path.clone(),
            added_unix_secs,
        };
        let contents =
            toml::to_string(&record).context("Failed to serialize the book record")?;
        if let Err(err) = fs::write(self.record_path(id), contents) {
            // Roll the blob back so list() never sees a half-added book.
            let _ = fs::remove_file(&blob_path);
            return Err(err).context("Failed to write the book record");
        }
        info!(id, name = %record.name, "Added book to library");
        Ok(record)
    }

    /// All records, most recently added first.
    pub fn list(&self) -> Result<Vec<BookRecord>> {
        let mut records = Vec::new();
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read library dir {}", self.root.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let Ok(data) = fs::read_to_string(&path) else {
                warn!(path = %path.display(), "Unreadable library record; skipping");
                continue;
            };
            match toml::from_str::<BookRecord>(&data) {
                Ok(record) => records.push(record),
                Err(err) => warn!(path = %path.display(), "Corrupt library record: {err}"),
            }
        }
        records.sort_by(|a, b| {
            b.added_unix_secs
                .cmp(&a.added_unix_secs)
                .then(b.id.cmp(&a.id))
        });
        Ok(records)
    }

    pub fn get(&self, id: u64) -> Result<Option<BookRecord>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read record {}", path.display()))?;
        let record = toml::from_str(&data)
            .with_context(|| format!("Corrupt record {}", path.display()))?;
        Ok(Some(record))
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        let Some(record) = self.get(id)? else {
            return Ok(());
        };
        fs::remove_file(self.record_path(id)).context("Failed to delete the book record")?;
        if let Err(err) = fs::remove_file(&record.path) {
            warn!(id, "Book blob already gone: {err}");
        }
        info!(id, name = %record.name, "Deleted book from library");
        Ok(())
    }

    fn record_path(&self, id: u64) -> PathBuf {
        self.root.join(format!("{id}.toml"))
    }

    fn next_id(&self) -> Result<u64> {
        let max = self.list()?.into_iter().map(|r| r.id).max().unwrap_or(0);
        Ok(max + 1)
    }
}

fn blob_filename(id: u64, name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_ascii_lowercase();
    format!("{id}-{}.{extension}", &digest[..16])
}
