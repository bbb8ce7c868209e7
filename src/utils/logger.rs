use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("archivantage=debug,info")
        } else {
            EnvFilter::new("archivantage=info")
        }
    })
}

/// 初始化 CLI 日誌：終端機 compact 輸出，並可選擇同時寫入日誌檔
pub fn init_cli_logger(verbose: bool, log_file: Option<&Path>) {
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(default_filter(verbose));

    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(default_filter(verbose)),
            ),
            Err(e) => {
                eprintln!("⚠️ Could not open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
}
