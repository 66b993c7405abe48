//! On-disk side of a run.
//!
//! [`prepare_output_dir`] is the precondition step executed before the
//! pipeline starts; [`ReportWriter`] is what persistence workers use to write
//! one report file per user. Each report path is owned by exactly one job, so
//! writers never contend on a file.

use crate::{Error, Result, UserRecord, report_file_name};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, io::AsyncWriteExt};

/// Ensures `dir` exists and is empty.
///
/// Missing directories are created (including parents); existing entries,
/// files and subdirectories alike, are removed.
///
/// # Errors
///
/// Returns [`Error::Storage`] naming the path that could not be created,
/// listed or removed.
pub async fn prepare_output_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    let storage_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| Error::Storage { path, source }
    };

    fs::create_dir_all(dir).await.map_err(storage_err(dir))?;

    let mut entries = fs::read_dir(dir).await.map_err(storage_err(dir))?;
    let mut removed = 0_usize;
    while let Some(entry) = entries.next_entry().await.map_err(storage_err(dir))? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(storage_err(&path))?;
        let removal = if file_type.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        removal.map_err(storage_err(&path))?;
        removed += 1;
    }

    tracing::debug!(dir = %dir.display(), removed, "Output directory prepared");
    Ok(())
}

/// Writes activity reports into a prepared output directory.
#[derive(Clone, Debug)]
pub struct ReportWriter {
    dir: Arc<Path>,
}

impl ReportWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: Arc::from(dir.as_ref()),
        }
    }

    /// Returns the report path for `record`.
    pub fn path_for(&self, record: &UserRecord) -> PathBuf {
        self.dir.join(report_file_name(record.id))
    }

    /// Renders and writes the report for `record`, returning its path.
    ///
    /// The file is created or truncated, written in full, flushed and synced
    /// before this returns. The handle is dropped on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persist`] carrying the record id if any step fails.
    pub async fn write(&self, record: &UserRecord) -> Result<PathBuf> {
        let path = self.path_for(record);
        let report = record.activity_report();

        let persist = async {
            let mut file = fs::File::create(&path).await?;
            file.write_all(report.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await
        };

        match persist.await {
            Ok(()) => Ok(path),
            Err(source) => Err(Error::Persist {
                id: record.id,
                path,
                source,
            }),
        }
    }
}
