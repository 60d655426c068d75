use crate::config::AppConfig;
use crate::utils::validation::validate_filename;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};

/// Local staging area: one directory for uploaded originals and one for
/// corrected output, both keyed by the validated client filename.
#[derive(Debug, Clone)]
pub struct Staging {
    upload_dir: PathBuf,
    corrected_dir: PathBuf,
}

impl Staging {
    pub fn new(upload_dir: impl Into<PathBuf>, corrected_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            corrected_dir: corrected_dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.upload_dir, &config.corrected_dir)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn corrected_dir(&self) -> &Path {
        &self.corrected_dir
    }

    /// Creates both directories if they are missing. Idempotent.
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.upload_dir, &self.corrected_dir] {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create staging directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn original_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.upload_dir.join(validate_filename(filename)?))
    }

    pub fn corrected_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.corrected_dir.join(validate_filename(filename)?))
    }

    /// Writes the uploaded bytes verbatim, replacing any earlier upload of the same name.
    pub async fn save_original(&self, filename: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.original_path(filename)?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to stage upload {}", path.display()))?;
        Ok(path)
    }

    /// Copies the staged original over the corrected path so a formatter can
    /// rewrite it in place without touching the original.
    pub async fn prepare_corrected(&self, filename: &str) -> Result<PathBuf> {
        let source = self.original_path(filename)?;
        let target = self.corrected_path(filename)?;
        fs::copy(&source, &target)
            .await
            .with_context(|| format!("Failed to copy {} for correction", source.display()))?;
        Ok(target)
    }

    pub async fn save_corrected(&self, filename: &str, content: &str) -> Result<PathBuf> {
        let path = self.corrected_path(filename)?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write corrected file {}", path.display()))?;
        Ok(path)
    }

    pub async fn read_corrected(&self, filename: &str) -> Result<String> {
        let path = self.corrected_path(filename)?;
        let bytes = fs::read(&path)
            .await
            .with_context(|| format!("Failed to read corrected file {}", path.display()))?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }

    /// Opens a corrected file for streaming. `Ok(None)` when nothing was staged
    /// under that name.
    pub async fn open_corrected(&self, filename: &str) -> Result<Option<(File, u64)>> {
        let path = self.corrected_path(filename)?;

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to stat {}", path.display()));
            }
        };
        if !metadata.is_file() {
            return Ok(None);
        }

        match File::open(&path).await {
            Ok(file) => Ok(Some((file, metadata.len()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to open {}", path.display())),
        }
    }
}
