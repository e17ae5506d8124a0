use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use tempfile::TempPath;

use crate::foundation::error::{ShowError, ShowResult};

/// Files whose deletion failed at release time, retried by [`purge_deferred_deletes`].
static DEFERRED_DELETES: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

fn deferred() -> std::sync::MutexGuard<'static, Vec<PathBuf>> {
    DEFERRED_DELETES
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Retry deleting scratch files whose release-time deletion failed.
///
/// Hosts call this before exiting. Returns the number of files still pending.
pub fn purge_deferred_deletes() -> usize {
    let mut pending = deferred();
    pending.retain(|path| match std::fs::remove_file(path) {
        Ok(()) => false,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "scratch file still not deletable");
            true
        }
    });
    pending.len()
}

/// Number of scratch files waiting in the deferred-delete registry.
pub fn deferred_delete_count() -> usize {
    deferred().len()
}

/// Append-only scratch file holding encoded bitmap payloads for one generation run.
///
/// Writers handed out by [`ScratchStore::writer`] borrow the store, so encoders that close or
/// drop their sink never close the file. Only [`ScratchStore::release`] closes and deletes it.
#[derive(Debug)]
pub struct ScratchStore {
    file: Option<File>,
    path: Option<TempPath>,
    len: u64,
}

impl ScratchStore {
    /// Create a scratch file (`lbm*.tmp`) inside `dir`.
    pub fn create_in(dir: &Path) -> ShowResult<Self> {
        let named = tempfile::Builder::new()
            .prefix("lbm")
            .suffix(".tmp")
            .tempfile_in(dir)
            .with_context(|| format!("create scratch file in '{}'", dir.display()))?;
        let (file, path) = named.into_parts();
        tracing::debug!(path = %path.display(), "scratch store created");
        Ok(Self {
            file: Some(file),
            path: Some(path),
            len: 0,
        })
    }

    /// Bytes appended so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// `true` when nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` once [`ScratchStore::release`] has run.
    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }

    /// Location of the backing file, while it exists.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn file_mut(&mut self) -> ShowResult<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| ShowError::state("scratch store already released"))
    }

    /// Borrow a writer positioned at the end of the store.
    pub fn writer(&mut self) -> ShowResult<ScratchWriter<'_>> {
        let len = self.len;
        self.file_mut()?
            .seek(SeekFrom::Start(len))
            .context("seek scratch store to end")?;
        Ok(ScratchWriter { store: self })
    }

    /// Read `buf.len()` bytes starting at `offset`.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> ShowResult<()> {
        let end = offset.saturating_add(buf.len() as u64);
        if end > self.len {
            return Err(ShowError::state(format!(
                "scratch range {offset}..{end} is past the end ({})",
                self.len
            )));
        }
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(offset))
            .context("seek scratch store")?;
        file.read_exact(buf).context("read scratch store")?;
        Ok(())
    }

    /// Discard everything past `len`, used to drop a partially written payload.
    pub fn truncate(&mut self, len: u64) -> ShowResult<()> {
        if len > self.len {
            return Err(ShowError::state("cannot truncate scratch store forward"));
        }
        self.file_mut()?
            .set_len(len)
            .context("truncate scratch store")?;
        self.len = len;
        Ok(())
    }

    /// Close and delete the backing file. Must be called exactly once.
    ///
    /// A failed delete is logged and queued for [`purge_deferred_deletes`]; it is not an error.
    pub fn release(&mut self) -> ShowResult<()> {
        let Some(file) = self.file.take() else {
            return Err(ShowError::state("scratch store released twice"));
        };
        drop(file);

        let Some(path) = self.path.take() else {
            return Ok(());
        };
        let path = match path.keep() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "scratch file could not be detached for deletion");
                return Ok(());
            }
        };
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "scratch store released"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "deferring scratch file delete");
                deferred().push(path);
            }
        }
        Ok(())
    }
}

impl Drop for ScratchStore {
    fn drop(&mut self) {
        if self.file.is_some() {
            // TempPath deletes on drop.
            tracing::warn!("scratch store dropped without release");
        }
    }
}

/// Borrowed append handle into a [`ScratchStore`].
pub struct ScratchWriter<'a> {
    store: &'a mut ScratchStore,
}

impl Write for ScratchWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let file = self
            .store
            .file
            .as_mut()
            .ok_or_else(|| std::io::Error::other("scratch store already released"))?;
        let n = file.write(buf)?;
        self.store.len += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.store.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/scratch.rs"]
mod tests;
