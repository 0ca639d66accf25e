use std::{
    collections::BTreeMap,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use crate::{
    error::{DashboardError, storage_failure},
    storage::ports::LocalStorage,
};

/// Local storage persisted as one JSON object on disk. The whole map is
/// rewritten through a temp file and renamed into place on every mutation;
/// the in-memory view only changes once that write has landed.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// A missing file starts empty. An unreadable JSON document is treated as
    /// absent and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DashboardError> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!(
                        target: "dashboard.storage",
                        path = %path.display(),
                        error = %err,
                        "storage_file_corrupted"
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(storage_failure(format!(
                    "failed to read local storage '{}': {err}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn items(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, DashboardError> {
        self.items
            .lock()
            .map_err(|_| storage_failure("file storage lock poisoned"))
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), DashboardError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|err| {
            storage_failure(format!(
                "failed to create storage directory '{}': {err}",
                parent.display()
            ))
        })?;

        let tmp_path = self.path.with_extension("tmp");
        let file = fs::File::create(&tmp_path).map_err(|err| {
            storage_failure(format!(
                "failed to create storage temp file '{}': {err}",
                tmp_path.display()
            ))
        })?;
        {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, items).map_err(|err| {
                storage_failure(format!(
                    "failed to serialize storage '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.write_all(b"\n").map_err(|err| {
                storage_failure(format!(
                    "failed to finalize storage '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.flush().map_err(|err| {
                storage_failure(format!(
                    "failed to flush storage '{}': {err}",
                    tmp_path.display()
                ))
            })?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|err| {
            storage_failure(format!(
                "failed to replace storage '{}' from '{}': {err}",
                self.path.display(),
                tmp_path.display()
            ))
        })
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, DashboardError> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        let mut items = self.items()?;
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), DashboardError> {
        let mut items = self.items()?;
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, DashboardError> {
        Ok(self.items()?.keys().cloned().collect())
    }
}
