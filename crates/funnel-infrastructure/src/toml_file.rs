//! Whole-file TOML reads and atomic writes.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use funnel_core::{FunnelError, Result};

/// A TOML document stored in a single file.
///
/// Writes go to a hidden temporary file next to the target and are renamed
/// into place, so readers never see a half-written document.
pub struct TomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> TomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is blank
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| FunnelError::io(format!("{}: {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = toml::from_str(&content).map_err(|e| FunnelError::Serialization {
            format: "TOML".to_string(),
            message: format!("{}: {}", self.path.display(), e),
        })?;
        Ok(Some(data))
    }

    /// Serializes `data` and replaces the file atomically.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| FunnelError::io(format!("{} has no file name", self.path.display())))?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn test_missing_and_blank_files_load_as_none() {
        let dir = TempDir::new().unwrap();
        let file = TomlFile::<Doc>::new(dir.path().join("doc.toml"));
        assert_eq!(file.load().unwrap(), None);

        fs::write(file.path(), "  \n").unwrap();
        assert_eq!(file.load().unwrap(), None);
    }

    #[test]
    fn test_save_creates_parent_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.toml");
        let file = TomlFile::<Doc>::new(&path);
        let doc = Doc {
            name: "funnel".into(),
            count: 3,
        };

        file.save(&doc).unwrap();
        assert_eq!(file.load().unwrap(), Some(doc));
        assert!(!path.with_file_name(".doc.toml.tmp").exists());
    }

    #[test]
    fn test_malformed_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let file = TomlFile::<Doc>::new(dir.path().join("doc.toml"));
        fs::write(file.path(), "name = [").unwrap();
        assert!(file.load().unwrap_err().is_serialization());
    }
}
