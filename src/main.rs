use archivantage::config::prompt::Prompter;
use archivantage::config::toml_config::TomlConfig;
use archivantage::core::ConfigProvider;
use archivantage::domain::model::YearStatus;
use archivantage::utils::error::{ArchiveError, ErrorSeverity};
use archivantage::utils::{logger, validation::Validate};
use archivantage::{ArchivePipeline, CliConfig, EtlEngine, LocalStorage};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;

const INTRO: &str = r#"
    -----------------------------------------------------------------------------
                           _      _                       _
        /\                | |    (_)                     | |
       /  \    _ __   ___ | |__   _ __   __  __ _  _ __  | |_   __ _   __ _   ___
      / /\ \  | '__| / __|| '_ \ | |\ \ / / / _` || '_ \ | __| / _` | / _` | / _ \
     / ____ \ | |   | (__ | | | || | \ V / | (_| || | | || |_ | (_| || (_| ||  __/
    /_/    \_\|_|    \___||_| |_||_|  \_/   \__,_||_| |_| \__| \__,_| \__, | \___|
                                                                       __/ |
                                                                      |___/
                 A gateway to analyze and explore the web archives
                                    Version {version}
    -----------------------------------------------------------------------------
"#;

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &ArchiveError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e.severity()));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    if let Some(path) = config.config.clone() {
        let toml = match TomlConfig::from_file(&path).and_then(|toml| toml.validate().map(|_| toml)) {
            Ok(toml) => toml,
            Err(e) => {
                eprintln!("❌ Could not use config file '{}'", path);
                fail(&e);
            }
        };
        config.merge_toml(toml);
    }

    // 初始化日誌
    logger::init_cli_logger(config.verbose, Some(Path::new(config.log_file())));
    tracing::info!("Starting archivantage {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    println!("{}", INTRO.replace("{version}", env!("CARGO_PKG_VERSION")));

    let interactive = !config.no_prompt && std::io::stdin().is_terminal();
    let request = if interactive {
        let stdin = std::io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
        config.build_request(Some(&mut prompter))
    } else {
        config.build_request::<std::io::StdinLock<'static>, std::io::Stdout>(None)
    };
    let request = match request {
        Ok(request) => request,
        Err(e) => fail(&e),
    };
    tracing::info!(
        "🔧 url={} years={:?} keywords={:?} formats={:?}",
        request.url,
        request.years,
        request.keywords,
        request.formats
    );

    let output_root = Path::new(config.output_path()).join(request.site_dir());
    let storage = LocalStorage::new(&output_root);
    let concurrency = config.concurrent_requests();
    let years = request.years.clone();
    let monitor_enabled = config.monitor;

    let pipeline = match ArchivePipeline::new(storage, &config, request) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(&e),
    };
    let engine = EtlEngine::new_with_monitoring(pipeline, concurrency, monitor_enabled);

    let summary = engine.run(&years).await;

    for outcome in &summary.outcomes {
        if let YearStatus::Failed { message } = &outcome.status {
            eprintln!("❌ {}: {}", outcome.year, message);
        }
    }
    tracing::info!(
        "✅ {} file(s) written under {}",
        summary.files_written(),
        output_root.display()
    );

    println!("All tasks are complete.");
    println!("Thank you for using ArchiVantage! You are now part of digital history.");

    let failed = summary.failed_years();
    if !failed.is_empty() {
        eprintln!("⚠️ Some years could not be processed: {:?}", failed);
        std::process::exit(exit_code(ErrorSeverity::Medium));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_follows_severity() {
        let unreadable = TomlConfig::from_file("does/not/exist/archivantage.toml").unwrap_err();
        assert_eq!(exit_code(unreadable.severity()), 3);

        let invalid = TomlConfig::from_toml_str("[target\nurl = ").unwrap_err();
        assert_eq!(exit_code(invalid.severity()), 1);

        let bad_value = TomlConfig::from_toml_str("[extract]\nconcurrent_requests = 0\n")
            .unwrap()
            .validate()
            .unwrap_err();
        assert_eq!(exit_code(bad_value.severity()), 1);
    }

    #[test]
    fn test_banner_shows_version() {
        let banner = INTRO.replace("{version}", env!("CARGO_PKG_VERSION"));
        assert!(banner.contains(&format!("Version {}", env!("CARGO_PKG_VERSION"))));
    }
}
