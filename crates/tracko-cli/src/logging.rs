//! 日誌初始化

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日誌
///
/// `RUST_LOG` 優先；未設定時預設為 `info`，`--verbose` 時為 `debug`。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}
