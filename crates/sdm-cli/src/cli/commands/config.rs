//! `sdm config` – show the config file path and current settings.

use anyhow::Result;
use sdm_core::config::{self, SdmConfig};

pub fn run_config(cfg: &SdmConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("Config file: {}", path.display());
    println!("  client_id:     {}", mask(&cfg.client_id));
    println!("  client_secret: {}", mask(&cfg.client_secret));
    println!("  batch_size:    {}", cfg.batch_size);
    println!("  bitrate_kbps:  {}", cfg.bitrate_kbps);
    println!("  format:        {}", cfg.format);
    println!("  work_dir_name: {}", cfg.work_dir_name);
    Ok(())
}

fn mask(value: &str) -> &'static str {
    if value.is_empty() {
        "(not set)"
    } else {
        "(set)"
    }
}
