use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};

/// File name of the model inside its cache directory.
pub const MODEL_FILE_NAME: &str = "model.onnx";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not found: {0}")]
    NotFound(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

/// Where to fetch a model from when it is not present locally.
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Directory name under the models cache
    pub name: String,
    pub url: String,
    /// Lowercase hex SHA-256 of the model file
    pub sha256: String,
}

/// Locates the model artifact on disk and fetches it into the cache when asked to.
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        Self::models_dir_from(env::var_os("SKINSIGHT_CACHE").map(PathBuf::from))
    }

    /// Resolves the models directory, preferring `cache_override` when given.
    pub fn models_dir_from(cache_override: Option<PathBuf>) -> PathBuf {
        // 1. Explicit override (the SKINSIGHT_CACHE variable)
        if let Some(path) = cache_override {
            return path.join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("skinsight").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("skinsight").join("models");
        }

        env::temp_dir().join("skinsight").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, name: &str) -> PathBuf {
        self.models_dir.join(name).join(MODEL_FILE_NAME)
    }

    pub fn is_model_downloaded(&self, name: &str) -> bool {
        let model_path = self.get_model_path(name);
        log::debug!("Model path: {:?} (exists: {})", model_path, model_path.exists());
        model_path.exists()
    }

    /// Picks the model file to load.
    ///
    /// With a `source`, the cached copy is verified (and fetched if missing or
    /// corrupt; `fresh` forces a new download). Without one, `local` must exist.
    pub async fn resolve(
        &self,
        local: &Path,
        source: Option<&ModelSource>,
        fresh: bool,
    ) -> Result<PathBuf, ModelError> {
        match source {
            Some(source) => {
                if fresh {
                    log::info!("Fresh download requested - removing any cached model...");
                    self.remove_download(&source.name)?;
                }
                self.ensure_model_downloaded(source).await?;
                Ok(self.get_model_path(&source.name))
            }
            None if local.is_file() => Ok(local.to_path_buf()),
            None => Err(ModelError::NotFound(local.display().to_string())),
        }
    }

    pub async fn download_model(&self, source: &ModelSource) -> Result<(), ModelError> {
        let _lock = self.download_lock.lock().await;

        let model_path = self.get_model_path(&source.name);
        if model_path.exists() {
            log::info!("Model file exists at {:?}, verifying...", model_path);
            if self.verify_file(&model_path, &source.sha256)? {
                log::info!("Existing model file verified successfully");
                return Ok(());
            }
            log::warn!("Model file verification failed, redownloading");
        }

        match self.download_and_verify_file(&source.url, &model_path, &source.sha256).await {
            Ok(()) => {
                log::info!("Model ready to use");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to setup model file: {}", e);
                // Cleanup on failure
                let _ = self.remove_download(&source.name);
                Err(e)
            }
        }
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ModelError> {
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::debug!("Verifying {:?}: {} bytes, hash {} (expected {})", path, bytes.len(), hash, expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash))
    }

    pub fn verify_model(&self, source: &ModelSource) -> Result<bool, ModelError> {
        let model_path = self.get_model_path(&source.name);
        if !model_path.exists() {
            log::info!("Model file {:?} does not exist", model_path);
            return Ok(false);
        }
        let ok = self.verify_file(&model_path, &source.sha256)?;
        log::info!("Model hash verification for {:?}: {}", model_path, ok);
        Ok(ok)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: &str,
    ) -> Result<(), ModelError> {
        log::info!("Downloading model from {} to {:?}", url, path);
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        let hash = sha256_hex(&bytes);
        if !hash.eq_ignore_ascii_case(expected_hash) {
            log::error!("Model hash mismatch: expected {}, got {}", expected_hash, hash);
            return Err(ModelError::HashMismatch {
                file: url.to_string(),
                expected: expected_hash.to_string(),
                actual: hash,
            });
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        if !self.verify_file(path, expected_hash)? {
            return Err(ModelError::VerificationFailed);
        }

        log::info!("Model downloaded and verified successfully");
        Ok(())
    }

    pub fn remove_download(&self, name: &str) -> Result<(), ModelError> {
        let model_path = self.get_model_path(name);
        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        Ok(())
    }

    /// Ensures that a model is downloaded and verified.
    /// If the model doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_model_downloaded(&self, source: &ModelSource) -> Result<(), ModelError> {
        if !self.is_model_downloaded(&source.name) {
            log::info!("Model '{}' not found, downloading...", source.name);
            self.download_model(source).await?;
        } else if !self.verify_model(source)? {
            log::info!("Model verification failed, re-downloading...");
            self.remove_download(&source.name)?;
            self.download_model(source).await?;
        } else {
            log::info!("Model verification successful");
        }
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn test_manager(tag: &str) -> ModelManager {
        let dir = env::temp_dir().join(format!("skinsight-test-{}", tag)).join("models");
        let _ = fs::remove_dir_all(&dir);
        ModelManager::new(dir).unwrap()
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(sha256_hex(b"hello"), HELLO_SHA256);
    }

    #[test]
    fn test_verify_model() -> Result<(), ModelError> {
        let manager = test_manager("verify");
        let source = ModelSource {
            name: "lesion".to_string(),
            url: "http://127.0.0.1:9/model.onnx".to_string(),
            sha256: HELLO_SHA256.to_string(),
        };

        assert!(!manager.verify_model(&source)?);

        let path = manager.get_model_path("lesion");
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(&path, "hello")?;
        assert!(manager.verify_model(&source)?);

        // Corrupt file and verify
        fs::write(&path, "corrupted data")?;
        assert!(!manager.verify_model(&source)?);

        manager.remove_download("lesion")?;
        assert!(!manager.is_model_downloaded("lesion"));
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_cached_model_skips_download() -> Result<(), ModelError> {
        let manager = test_manager("cached");
        let source = ModelSource {
            name: "lesion".to_string(),
            // Nothing listens here; a download attempt would fail.
            url: "http://127.0.0.1:9/model.onnx".to_string(),
            sha256: HELLO_SHA256.to_string(),
        };
        let path = manager.get_model_path("lesion");
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(&path, "hello")?;

        let resolved = manager.resolve(Path::new("unused.onnx"), Some(&source), false).await?;
        assert_eq!(resolved, path);
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_local_model() {
        let manager = test_manager("local");
        let missing = manager.models_dir().join("missing.onnx");
        assert!(matches!(
            manager.resolve(&missing, None, false).await,
            Err(ModelError::NotFound(_))
        ));

        let local = manager.models_dir().join("local.onnx");
        fs::write(&local, "bytes").unwrap();
        assert_eq!(manager.resolve(&local, None, false).await.unwrap(), local);
    }

    #[test]
    fn test_default_models_dir() {
        let path = ModelManager::models_dir_from(Some(PathBuf::from("/tmp/skinsight-cache")));
        assert_eq!(path, PathBuf::from("/tmp/skinsight-cache/models"));

        let path = ModelManager::models_dir_from(None);
        assert!(path.ends_with("skinsight/models"));
    }
}
