//! 全局 tracing 订阅器
//!
//! 控制台与日志文件同时输出；`RUST_LOG` 优先，其次按 `VERBOSE_LOGGING` 选择 debug / info。

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志，日志文件以追加方式打开（表头由 `init_log_file` 写入）
pub fn init(verbose_logging: bool, log_file: &Path) -> Result<()> {
    let default_level = if verbose_logging { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("exam_grader={default_level},warn")));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("无法打开日志文件: {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("日志系统已初始化")?;

    Ok(())
}
