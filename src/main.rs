//! Photo Triage - keyboard-driven photo and video sorting
//!
//! Shows each media file under a source directory and routes it to one of
//! several destination folders with a single key press.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use photo_triage::cli::exit_code;
use photo_triage::{
    Cli, Config, DestinationRouter, MediaCatalog, NavigationSession, PlaybackController,
    SessionSettings, SessionStats, TransferMode, TuiApp, resolve_backend, sort_entries,
};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! CLI 输出美化模块
    //!
    //! 会话结束后的彩色摘要输出。

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI 主题颜色
    pub struct CliTheme;

    impl CliTheme {
        /// 成功颜色（绿色）
        pub const SUCCESS: Color = Color::Green;
        /// 警告颜色（黄色）
        pub const WARNING: Color = Color::Yellow;
        /// 错误颜色（红色）
        pub const ERROR: Color = Color::Red;
        /// 提示颜色（暗灰色）
        pub const HINT: Color = Color::DarkGrey;
        /// 强调颜色（青色）
        pub const ACCENT: Color = Color::Cyan;
    }

    /// 打印分隔线
    pub fn print_separator() {
        let _ = stdout().execute(Print(&format!("{}\n", "─".repeat(60))));
    }

    /// 打印居中的标题
    pub fn print_title(title: &str) {
        let width: usize = 60;
        let padding = width.saturating_sub(title.len()) / 2;
        let left_pad = " ".repeat(padding.saturating_sub(1));

        let _ = stdout().execute(Print(&format!(
            "{}{} {}{}\n",
            left_pad,
            "╔".bold().stylize(),
            title.bold().stylize(),
            "╗".bold().stylize(),
        )));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印错误消息
    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 打印键值对
    pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = match value_color {
            Some(color) => style(value).with(color),
            None => style(value).bold(),
        };
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印统计项
    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印日志文件路径
    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print("\n"));
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style("Log file: ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    // Usage errors exit with 1, help and version with 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(exit_code(&e));
        }
    };

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    cli.validate()?;

    let exe_dir = get_executable_dir()?;
    let config = load_config(&cli, &exe_dir)?;
    config.validate()?;
    let source = validate_source(&cli.source)?;

    let log_path = get_log_path(&exe_dir, &config);
    let _guard = setup_file_only_logging(&log_path, config.verbose, cli.json_log)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        source = %source.display(),
        "Photo Triage starting"
    );
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    let router = DestinationRouter::new(&cli.destinations)?;
    let excluded = canonical_destinations(&source, &cli.destinations)?;

    let mut entries = MediaCatalog::new(&config)
        .with_excluded(excluded)
        .discover(&source, config.file_types);
    sort_entries(&mut entries, config.sort);
    info!(count = entries.len(), sort = %config.sort, "Media sorted");

    let backend = resolve_backend(config.video_backend, config.poll_interval());
    let controller = PlaybackController::new(backend, config.poll_interval());
    let session = NavigationSession::new(
        &source,
        entries,
        router,
        controller,
        SessionSettings::from(&config),
    );

    let stats = TuiApp::new(session, source.clone())
        .run()
        .context("terminal session failed")?;

    info!(
        transferred = stats.transferred,
        skipped = stats.skipped,
        failed = stats.failed,
        log_file = %log_path.display(),
        "Session closed"
    );
    print_summary(&stats, config.transfer_mode, &log_path);
    Ok(())
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// `<log_dir>/Triage_<timestamp>.log`, defaulting to `Log` beside the executable
fn get_log_path(exe_dir: &Path, config: &Config) -> PathBuf {
    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| exe_dir.join("Log"));
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("Triage_{}.log", timestamp))
}

/// Resolve config path - supports shorthand syntax
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());

    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };
    Ok(config)
}

/// The source must be an existing directory
fn validate_source(source: &Path) -> Result<PathBuf> {
    if !source.exists() {
        anyhow::bail!("Source directory does not exist: {}", source.display());
    }
    if !source.is_dir() {
        anyhow::bail!("Source is not a directory: {}", source.display());
    }
    source
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", source.display()))
}

/// Absolute destination paths, rejecting the source itself
fn canonical_destinations(source: &Path, destinations: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::with_capacity(destinations.len());
    for dest in destinations {
        let dest = dest
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", dest.display()))?;
        if dest == source {
            anyhow::bail!(
                "Destination {} is the source directory",
                dest.display()
            );
        }
        resolved.push(dest);
    }
    Ok(resolved)
}

/// File-only logging; the terminal belongs to the viewer
fn setup_file_only_logging(
    log_path: &Path,
    verbose: bool,
    json_log: bool,
) -> Result<Option<WorkerGuard>> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(Some(guard))
}

fn print_summary(stats: &SessionStats, mode: TransferMode, log_path: &Path) {
    use cli_output::*;

    print_separator();
    print_title("Triage Complete");
    print_separator();

    print_blank();
    print_stat(mode.verb(), &stats.transferred.to_string(), CliTheme::SUCCESS);
    print_stat("Skipped", &stats.skipped.to_string(), CliTheme::WARNING);
    print_stat("Failed", &stats.failed.to_string(), CliTheme::ERROR);
    print_blank();

    if !stats.failures.is_empty() {
        print_separator();
        print_error(&format!("{} files failed", stats.failures.len()));
        print_blank();
        for (path, reason) in &stats.failures {
            print_key_value(&path.display().to_string(), reason, Some(CliTheme::ERROR));
        }
    }

    print_separator();
    print_log_path(&log_path.display().to_string());
}
