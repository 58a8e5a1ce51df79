use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, error, warn};

use crate::{calendar::WeekAddress, error::WorklogError};

use super::entities::WeekFile;

/// Interface for abstracting storage of week files.
pub trait WeekStorage {
    /// Reads a week. A week without a file is empty, only unreadable or corrupt files fail.
    fn load(&self, address: WeekAddress) -> impl Future<Output = Result<WeekFile, WorklogError>>;

    /// Replaces the stored week. The previous content is kept if writing fails.
    fn save(
        &self,
        address: WeekAddress,
        week: &WeekFile,
    ) -> impl Future<Output = Result<(), WorklogError>>;

    /// Makes sure the directory of the week and an empty week file exist.
    fn create_week_if_not_exist(
        &self,
        address: WeekAddress,
    ) -> impl Future<Output = Result<(), WorklogError>>;
}

impl<T: Deref> WeekStorage for T
where
    T::Target: WeekStorage,
{
    fn load(&self, address: WeekAddress) -> impl Future<Output = Result<WeekFile, WorklogError>> {
        self.deref().load(address)
    }

    fn save(
        &self,
        address: WeekAddress,
        week: &WeekFile,
    ) -> impl Future<Output = Result<(), WorklogError>> {
        self.deref().save(address, week)
    }

    fn create_week_if_not_exist(
        &self,
        address: WeekAddress,
    ) -> impl Future<Output = Result<(), WorklogError>> {
        self.deref().create_week_if_not_exist(address)
    }
}

/// The main realization of [WeekStorage]. Weeks are stored as JSON files under
/// `<logs_root>/<year>/<week>`. Directories are only created when a week is written.
pub struct WeekStorageImpl {
    logs_root: PathBuf,
}

impl WeekStorageImpl {
    pub fn new(logs_root: PathBuf) -> Self {
        Self { logs_root }
    }

    pub fn week_path(&self, address: WeekAddress) -> PathBuf {
        self.logs_root.join(address.relative_path())
    }
}

impl WeekStorage for WeekStorageImpl {
    async fn load(&self, address: WeekAddress) -> Result<WeekFile, WorklogError> {
        let path = self.week_path(address);
        debug!("Loading week file {path:?}");

        let raw = match read_locked(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Week file {path:?} doesn't exist yet");
                return Ok(WeekFile::default());
            }
            Err(source) => return Err(WorklogError::StorageRead { path, source }),
        };

        // A file that was created but never written has nothing to lose.
        if raw.trim().is_empty() {
            return Ok(WeekFile::default());
        }

        serde_json::from_str(&raw).map_err(|source| WorklogError::StorageCorrupt { path, source })
    }

    async fn save(&self, address: WeekAddress, week: &WeekFile) -> Result<(), WorklogError> {
        let path = self.week_path(address);
        let write_failure = |source| WorklogError::StorageWriteFailure {
            path: path.clone(),
            source,
        };
        debug!("Saving week file {path:?}");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(write_failure)?;
        }

        let data = serde_json::to_vec(week).map_err(|source| WorklogError::StorageEncode {
            path: path.clone(),
            source,
        })?;

        // The process of saving is as such.
        // 1. Write the new content next to the week file.
        // 2. Keep a backup of the current week file.
        // 3. Rename the new content over the week file, restoring the backup if that fails.
        let temp = path.with_extension("tmp");
        if let Err(e) = write_locked(&temp, &data).await {
            remove_leftover(&temp).await;
            return Err(write_failure(e));
        }
        replace_with_backup(&temp, &path)
            .await
            .map_err(write_failure)?;

        debug!("Saved week file {path:?}");
        Ok(())
    }

    async fn create_week_if_not_exist(&self, address: WeekAddress) -> Result<(), WorklogError> {
        let path = self.week_path(address);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| WorklogError::StorageWriteFailure {
                    path: parent.to_owned(),
                    source,
                })?;
        }

        let exists = fs::try_exists(&path)
            .await
            .map_err(|source| WorklogError::StorageRead {
                path: path.clone(),
                source,
            })?;
        if exists {
            debug!("Week file {path:?} already exists");
            return Ok(());
        }

        self.save(address, &WeekFile::default()).await?;
        debug!("Created week file {path:?}");
        Ok(())
    }
}

async fn read_locked(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path).await?;
    file.lock_shared()?;
    let mut raw = String::new();
    let result = file.read_to_string(&mut raw).await;
    file.unlock_async().await?;
    result.map(|_| raw)
}

async fn write_locked(path: &Path, data: &[u8]) -> Result<(), std::io::Error> {
    let mut file = File::create(path).await?;
    file.lock_exclusive()?;
    let result = async {
        file.write_all(data).await?;
        file.sync_all().await
    }
    .await;
    file.unlock_async().await?;
    result
}

/// Moves `temp` over `path`. The previous content of `path` is copied aside first and put back
/// if the move fails. `temp` never outlives the call.
async fn replace_with_backup(temp: &Path, path: &Path) -> Result<(), std::io::Error> {
    let backup = path.with_extension("bak");

    let has_backup = match fs::copy(path, &backup).await {
        Ok(_) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            remove_leftover(temp).await;
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(temp, path).await {
        warn!("Replacing {path:?} failed, restoring from backup: {e}");
        remove_leftover(temp).await;
        if has_backup {
            match fs::copy(&backup, path).await {
                Ok(_) => remove_leftover(&backup).await,
                Err(restore) => error!("Couldn't restore {path:?} from {backup:?}: {restore}"),
            }
        }
        return Err(e);
    }

    if has_backup {
        remove_leftover(&backup).await;
    }
    Ok(())
}

async fn remove_leftover(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!("Couldn't remove {path:?}: {e}");
    }
}
