// File: src/storage.rs
use crate::model::{CalendarEvent, StoredEvent};
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The normalized events file (a JSON array of `CalendarEvent`).
pub struct EventFile;

impl EventFile {
    /// Sidecar lock path, e.g. "events.json.lock".
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on the sidecar file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Write to a .tmp sibling, then rename over the target.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        fs::rename(&tmp_path, path).with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(())
    }

    pub fn save(path: &Path, events: &[CalendarEvent]) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        Self::with_lock(path, || {
            let json = serde_json::to_string_pretty(events)?;
            Self::atomic_write(path, json)
        })
    }

    /// Reads the file, skipping records without a usable start or end.
    /// A missing file is an empty list.
    pub fn load(path: &Path) -> Result<Vec<CalendarEvent>> {
        if !path.exists() {
            return Ok(vec![]);
        }
        Self::with_lock(path, || {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read events: {:?}", path))?;
            let stored = serde_json::from_str::<Vec<StoredEvent>>(&json)
                .with_context(|| format!("Invalid events file: {:?}", path))?;
            let total = stored.len();
            let events: Vec<CalendarEvent> =
                stored.into_iter().filter_map(StoredEvent::into_event).collect();
            if events.len() != total {
                debug!("skipped {} records without dates", total - events.len());
            }
            Ok(events)
        })
    }
}
