use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/sdm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdmConfig {
    /// Spotify application client id (client-credentials flow).
    #[serde(default)]
    pub client_id: String,
    /// Spotify application client secret.
    #[serde(default)]
    pub client_secret: String,
    /// How many tracks to download concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Target audio bitrate in kbit/s.
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,
    /// Target audio format: ffmpeg muxer name, doubles as file extension.
    #[serde(default = "default_format")]
    pub format: String,
    /// Name of the hidden working directory under the output directory.
    #[serde(default = "default_work_dir_name")]
    pub work_dir_name: String,
}

fn default_batch_size() -> usize {
    1
}

fn default_bitrate_kbps() -> u32 {
    320
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_work_dir_name() -> String {
    ".sdm".to_string()
}

impl Default for SdmConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            batch_size: default_batch_size(),
            bitrate_kbps: default_bitrate_kbps(),
            format: default_format(),
            work_dir_name: default_work_dir_name(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sdm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SdmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SdmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SdmConfig = toml::from_str(&data)?;
    Ok(cfg)
}
