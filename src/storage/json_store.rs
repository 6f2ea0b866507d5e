use crate::item::RecruitmentItem;
use crate::ScoutError;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Flat JSON file holding the full item set
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Creates a handle for the store at `path`; nothing is read yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads all items, treating a missing, unreadable or malformed file as empty
    ///
    /// Records that do not fit the item shape are skipped one by one; the rest
    /// of the file still loads.
    pub fn load(&self) -> Vec<RecruitmentItem> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No store at {}, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read store {}: {}; treating as empty",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        let records = match serde_json::from_str::<Vec<Value>>(&content) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    "Store {} is malformed ({}); treating as empty",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        let total = records.len();
        let items: Vec<RecruitmentItem> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(
                        "Skipping record {} in {}: {}",
                        index,
                        self.path.display(),
                        e
                    );
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Loaded {} of {} items from {}",
            items.len(),
            total,
            self.path.display()
        );
        items
    }

    /// Rewrites the whole store
    ///
    /// The JSON is written to a temp file next to the store, synced, and then
    /// renamed over it, so readers never observe a half-written file.
    pub fn save(&self, items: &[RecruitmentItem]) -> Result<(), ScoutError> {
        let json = serde_json::to_string_pretty(items)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.storage_error("create directory", e))?;
        }

        let temp_path = self.temp_path();
        let write_result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            Ok(())
        })();

        if let Err(e) = write_result {
            let _ = fs::remove_file(&temp_path);
            return Err(self.storage_error("write temp file", e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.storage_error("replace store", e));
        }

        tracing::debug!("Wrote {} items to {}", items.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
    }

    fn storage_error(&self, action: &str, e: std::io::Error) -> ScoutError {
        ScoutError::Storage {
            path: self.path.display().to_string(),
            message: format!("failed to {}: {}", action, e),
        }
    }
}
