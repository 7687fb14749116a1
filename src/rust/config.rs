use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::model_manager::{ModelManager, ModelSource};
use crate::runtime::{optimization_level_from_u8, RuntimeConfig};

/// Directory name used for a downloaded model inside the cache.
pub const DEFAULT_MODEL_NAME: &str = "skin-lesion";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the ONNX model file
    #[arg(short, long, env = "SKINSIGHT_MODEL", default_value = "model/model.onnx")]
    pub model: PathBuf,

    /// Address to listen on
    #[arg(long, env = "SKINSIGHT_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "SKINSIGHT_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Download the model from this URL into the cache instead of using --model
    #[arg(long, env = "SKINSIGHT_MODEL_URL", requires = "model_sha256")]
    pub model_url: Option<String>,

    /// Expected SHA-256 of the downloaded model
    #[arg(long, env = "SKINSIGHT_MODEL_SHA256")]
    pub model_sha256: Option<String>,

    /// Cache directory for downloaded models
    #[arg(long, env = "SKINSIGHT_CACHE")]
    pub cache_dir: Option<PathBuf>,

    /// Force a fresh download of the model file
    #[arg(short, long)]
    pub fresh: bool,

    /// Threads used to parallelize execution within ONNX operators (0 = runtime default)
    #[arg(long, env = "SKINSIGHT_INTRA_THREADS", default_value_t = 0)]
    pub intra_threads: usize,

    /// Threads used to run independent ONNX operators in parallel (0 = runtime default)
    #[arg(long, env = "SKINSIGHT_INTER_THREADS", default_value_t = 0)]
    pub inter_threads: usize,

    /// Graph optimization level, 0 (disabled) to 3 (all)
    #[arg(long, env = "SKINSIGHT_OPTIMIZATION_LEVEL", default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub optimization_level: u8,
}

impl Args {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: optimization_level_from_u8(self.optimization_level),
        }
    }

    /// The remote model to fetch, if a URL was configured.
    pub fn model_source(&self) -> Option<ModelSource> {
        let url = self.model_url.clone()?;
        Some(ModelSource {
            name: DEFAULT_MODEL_NAME.to_string(),
            url,
            sha256: self.model_sha256.clone().unwrap_or_default(),
        })
    }

    pub fn model_manager(&self) -> std::io::Result<ModelManager> {
        match &self.cache_dir {
            Some(dir) => ModelManager::new(dir.join("models")),
            None => ModelManager::new_default(),
        }
    }
}
