//! 設定檔載入

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracko_core::TrackerConfig;

use crate::cli::Cli;

/// 預設設定檔：`<config dir>/tracko/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tracko").join("config.json"))
}

/// 讀取設定檔
fn load_file(path: &Path) -> Result<TrackerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("設定檔讀取失敗: {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| format!("設定檔格式錯誤: {}", path.display()))?;
    tracing::debug!("已載入設定檔: {}", path.display());
    Ok(config)
}

/// 依優先順序組合設定：命令列 > 設定檔 > 預設值
///
/// 明確指定的 `--config` 必須存在；預設位置的設定檔可有可無。
pub fn resolve(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = match &cli.config {
        Some(path) => load_file(path)?,
        None => match default_config_path().filter(|path| path.exists()) {
            Some(path) => load_file(&path)?,
            None => TrackerConfig::default(),
        },
    };

    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.clone());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_decimal::Decimal;

    #[test]
    fn test_explicit_config_with_data_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"eta_window_days": 14, "ratio_tolerance": "0.05"}"#).unwrap();

        let cli = Cli::try_parse_from([
            "tracko",
            "--config",
            path.to_str().unwrap(),
            "--data-dir",
            "/tmp/tracko-test",
            "stock",
        ])
        .unwrap();
        let config = resolve(&cli).unwrap();

        assert_eq!(config.eta_window_days, 14);
        assert_eq!(config.ratio_tolerance, Decimal::new(5, 2));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/tracko-test"));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let cli = Cli::try_parse_from(["tracko", "--config", "/nonexistent/tracko.json", "stock"]).unwrap();
        assert!(resolve(&cli).is_err());
    }
}
