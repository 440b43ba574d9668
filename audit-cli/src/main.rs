mod cli;
mod commands;
mod console;

use std::process::ExitCode;
use std::sync::Arc;

use audit_store::{AuditTracker, load_config, logger};
use clap::Parser;
use shared::AppError;

use cli::Cli;
use console::ConsoleNotifier;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 1. 配置 (.env + 环境变量), 命令行参数优先
    let mut config = load_config();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if cli.verbose {
        config.log_level = "debug".into();
    }

    // 2. 日志
    logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        key = %config.storage_key,
        "comar-audit starting"
    );

    // 3. 打开存储
    let tracker = match AuditTracker::open(&config) {
        Ok(tracker) => tracker.with_notifier(Arc::new(ConsoleNotifier)),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // 4. 执行命令
    let result = commands::run(cli.command, &tracker, &mut std::io::stdout().lock());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Rejected operations were already reported by the notifier
            if e.downcast_ref::<AppError>().is_none() {
                tracing::error!(error = %e, "Command failed");
                eprintln!("error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
