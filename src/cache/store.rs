use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::{has_name, new_record, Record, StoreDocument};
use crate::constants::{DEFAULT_FLUSH_THRESHOLD, DEFAULT_TABLE};
use crate::utils::{ensure_dir, Result, TemplateError};

/// Named-record store backed by a single JSON file.
///
/// Records live in tables; passing `None` as the table selects the default
/// table. The whole document is held in memory and written back once
/// `flush_threshold` writes have accumulated, on [`flush`](Self::flush),
/// on [`close`](Self::close) and on drop.
///
/// Single writer only: nothing guards the file against other processes.
#[derive(Debug)]
pub struct CacheHandler {
    path: PathBuf,
    document: Option<StoreDocument>,
    pending_writes: usize,
    flush_threshold: usize,
}

/// Options for opening a [`CacheHandler`]
#[derive(Debug, Clone)]
pub struct CacheHandlerBuilder {
    path: PathBuf,
    flush_threshold: usize,
}

impl CacheHandlerBuilder {
    /// Number of buffered writes that triggers a flush (at least 1)
    pub fn flush_threshold(mut self, writes: usize) -> Self {
        self.flush_threshold = writes.max(1);
        self
    }

    pub fn open(self) -> Result<CacheHandler> {
        let document = load_document(&self.path)?;
        debug!("Opened cache store {}", self.path.display());

        Ok(CacheHandler {
            path: self.path,
            document: Some(document),
            pending_writes: 0,
            flush_threshold: self.flush_threshold,
        })
    }
}

impl CacheHandler {
    /// Open (or create) the store at `path` with default options
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(path).open()
    }

    pub fn builder(path: impl Into<PathBuf>) -> CacheHandlerBuilder {
        CacheHandlerBuilder {
            path: path.into(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store was destroyed by clearing the default table
    pub fn is_closed(&self) -> bool {
        self.document.is_none()
    }

    /// Whether a record called `name` exists
    pub fn exists(&self, name: &str, table: Option<&str>) -> Result<bool> {
        Ok(self
            .document()?
            .table(table_name(table))
            .iter()
            .any(|record| has_name(record, name)))
    }

    /// Insert `{name, key: value}` unless a record called `name` already exists.
    ///
    /// An existing record is left untouched.
    pub fn save(
        &mut self,
        name: &str,
        key: &str,
        value: impl Into<Value>,
        table: Option<&str>,
    ) -> Result<()> {
        if self.exists(name, table)? {
            return Ok(());
        }

        let record = new_record(name, key, value.into());
        self.document_mut()?
            .table_entry(table_name(table))
            .push(record);
        self.record_write()
    }

    /// Set `key = value` on the record called `name`, if there is one
    pub fn update(
        &mut self,
        name: &str,
        key: &str,
        value: impl Into<Value>,
        table: Option<&str>,
    ) -> Result<()> {
        let value = value.into();
        let Some(records) = self.document_mut()?.table_mut(table_name(table)) else {
            return Ok(());
        };

        let mut updated = false;
        for record in records.iter_mut().filter(|record| has_name(record, name)) {
            record.insert(key.to_string(), value.clone());
            updated = true;
        }

        if updated {
            self.record_write()?;
        }
        Ok(())
    }

    /// The record called `name`, or an empty record
    pub fn get(&self, name: &str, table: Option<&str>) -> Result<Record> {
        Ok(self
            .document()?
            .table(table_name(table))
            .iter()
            .find(|record| has_name(record, name))
            .cloned()
            .unwrap_or_default())
    }

    /// Every record of the table in storage order
    pub fn list_all(&self, table: Option<&str>) -> Result<Vec<Record>> {
        Ok(self.document()?.table(table_name(table)).to_vec())
    }

    /// Delete the record called `name`; absent records are ignored
    pub fn remove(&mut self, name: &str, table: Option<&str>) -> Result<()> {
        let Some(records) = self.document_mut()?.table_mut(table_name(table)) else {
            return Ok(());
        };

        let before = records.len();
        records.retain(|record| !has_name(record, name));
        if records.len() != before {
            self.record_write()?;
        }
        Ok(())
    }

    /// Remove every record from a table.
    ///
    /// Clearing a named table only empties that table. Clearing the default
    /// table (`None`) also closes the store and deletes its file; every later
    /// call on this handler returns [`TemplateError::CacheClosed`].
    pub fn clear(&mut self, table: Option<&str>) -> Result<()> {
        match table {
            Some(name) => {
                if let Some(records) = self.document_mut()?.table_mut(name) {
                    records.clear();
                    self.record_write()?;
                }
                Ok(())
            }
            None => {
                self.document()?;
                fs::remove_file(&self.path)?;
                self.document = None;
                self.pending_writes = 0;
                info!("Deleted cache store {}", self.path.display());
                Ok(())
            }
        }
    }

    /// Remove a named table entirely
    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        if self.document_mut()?.drop_table(table) {
            self.record_write()?;
        }
        Ok(())
    }

    /// Names of the tables present in the store
    pub fn tables(&self) -> Result<Vec<String>> {
        Ok(self.document()?.table_names())
    }

    /// Write buffered changes to disk now
    pub fn flush(&mut self) -> Result<()> {
        let document = self.document()?;
        if self.pending_writes > 0 {
            write_document(&self.path, document)?;
            debug!(
                "Flushed {} writes to {}",
                self.pending_writes,
                self.path.display()
            );
            self.pending_writes = 0;
        }
        Ok(())
    }

    /// Flush and release the store
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        self.document = None;
        Ok(())
    }

    fn document(&self) -> Result<&StoreDocument> {
        self.document
            .as_ref()
            .ok_or_else(|| TemplateError::CacheClosed(self.path.clone()))
    }

    fn document_mut(&mut self) -> Result<&mut StoreDocument> {
        self.document
            .as_mut()
            .ok_or_else(|| TemplateError::CacheClosed(self.path.clone()))
    }

    fn record_write(&mut self) -> Result<()> {
        self.pending_writes += 1;
        if self.pending_writes >= self.flush_threshold {
            self.flush()?;
        }
        Ok(())
    }
}

impl Drop for CacheHandler {
    fn drop(&mut self) {
        if self.document.is_some() && self.pending_writes > 0 {
            if let Err(e) = self.flush() {
                warn!("Failed to flush cache store {}: {}", self.path.display(), e);
            }
        }
    }
}

fn table_name(table: Option<&str>) -> &str {
    table.unwrap_or(DEFAULT_TABLE)
}

fn load_document(path: &Path) -> Result<StoreDocument> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    if !path.exists() {
        let document = StoreDocument::default();
        write_document(path, &document)?;
        return Ok(document);
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(StoreDocument::default());
    }

    serde_json::from_str(&content).map_err(|source| TemplateError::CacheCorrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(path: &Path, document: &StoreDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;

    // Write atomically via temp file
    let mut temp_name = OsString::from(path.as_os_str());
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
