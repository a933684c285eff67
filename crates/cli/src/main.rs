use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use openeyes_core::alert::domain::alarm_controller::AlarmController;
use openeyes_core::alert::infrastructure::log_alarm_sink::LogAlarmSink;
use openeyes_core::config::monitor_config::{ConfigError, MonitorConfig};
use openeyes_core::pipeline::detection_source::DetectionSource;
use openeyes_core::pipeline::eye_state_monitor::{EyeStateMonitor, FrameReport};
use openeyes_core::pipeline::infrastructure::jsonl_detection_source::JsonlDetectionSource;
use openeyes_core::pipeline::infrastructure::threaded_session_executor::ThreadedSessionExecutor;
use openeyes_core::pipeline::monitor_session_use_case::MonitorSessionUseCase;
use openeyes_core::pipeline::session_executor::ReportCallback;
use openeyes_core::pipeline::session_logger::{SessionLogger, StdoutSessionLogger};
use openeyes_core::shared::constants::APP_NAME;

type ReportWriter = Arc<Mutex<BufWriter<File>>>;

/// Eye state monitoring from fused face and eye detections.
#[derive(Parser)]
#[command(name = "openeyes", version)]
struct Cli {
    /// Config file (default: platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded detection trace through the monitor.
    Replay {
        /// JSON-lines trace file, or `-` for stdin.
        trace: PathBuf,

        /// Minimum overlap ratio for two eye detections to be one eye (0.0-1.0].
        #[arg(long)]
        overlap_threshold: Option<f64>,

        /// How long eyes must stay closed before CLOSED is reported.
        #[arg(long)]
        closed_threshold_ms: Option<u64>,

        /// Write per-frame reports as JSON lines.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Destination (default: platform config directory).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Show version and effective configuration.
    Info {
        #[arg(long, value_enum, default_value_t = InfoFormat::Table)]
        format: InfoFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InfoFormat {
    Json,
    Yaml,
    Table,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::InitConfig { output, force } = &cli.command {
        init_logger(&MonitorConfig::default(), cli.verbose)?;
        return run_init_config(output.as_deref(), *force);
    }

    let config = load_config(cli.config.as_deref())?;
    init_logger(&config, cli.verbose)?;

    match cli.command {
        Command::Replay {
            trace,
            overlap_threshold,
            closed_threshold_ms,
            output,
        } => {
            let config = apply_overrides(config, overlap_threshold, closed_threshold_ms)?;
            run_replay(&config, &trace, output.as_deref())
        }
        Command::Info { format } => run_info(&config, cli.config.as_deref(), format),
        Command::InitConfig { .. } => Ok(()),
    }
}

fn init_logger(config: &MonitorConfig, verbose: bool) -> Result<(), ConfigError> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level_filter()?
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    match path {
        Some(path) => MonitorConfig::load(path),
        None => MonitorConfig::load_or_default(),
    }
}

fn apply_overrides(
    mut config: MonitorConfig,
    overlap_threshold: Option<f64>,
    closed_threshold_ms: Option<u64>,
) -> Result<MonitorConfig, ConfigError> {
    if let Some(threshold) = overlap_threshold {
        config.overlap_threshold = threshold;
    }
    if let Some(ms) = closed_threshold_ms {
        config.closed_threshold_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

fn run_replay(
    config: &MonitorConfig,
    trace: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: Box<dyn DetectionSource> = if trace == Path::new("-") {
        Box::new(JsonlDetectionSource::from_reader(Box::new(BufReader::new(
            std::io::stdin(),
        ))))
    } else {
        Box::new(JsonlDetectionSource::open(trace)?)
    };

    let report_writer = output.map(create_report_writer).transpose()?;
    let on_report = report_writer.clone().map(report_callback);

    let mut use_case = MonitorSessionUseCase::new(
        source,
        EyeStateMonitor::new(config),
        AlarmController::new(Box::new(LogAlarmSink::new("alarm"))),
        Box::new(ThreadedSessionExecutor::with_capacity(config.channel_capacity)),
        on_report,
        None,
    );
    let cancelled = use_case.cancel_handle();

    let mut logger = StdoutSessionLogger::default();
    let summary = use_case.execute(&mut logger)?;
    logger.summary();

    if let (Some(writer), Some(path)) = (report_writer, output) {
        writer
            .lock()
            .map_err(|_| "report writer lock poisoned")?
            .flush()?;
        if cancelled.load(Ordering::Relaxed) {
            let message = format!("Replay stopped early: could not write {}", path.display());
            return Err(message.into());
        }
        log::info!("Reports written to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn create_report_writer(path: &Path) -> Result<ReportWriter, Box<dyn std::error::Error>> {
    let file = File::create(path)
        .map_err(|e| format!("Cannot create report file {}: {e}", path.display()))?;
    Ok(Arc::new(Mutex::new(BufWriter::new(file))))
}

fn report_callback(writer: ReportWriter) -> ReportCallback {
    Box::new(move |timestamp, report| match write_report(&writer, timestamp, report) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Failed to write report: {e}");
            false
        }
    })
}

/// Appends one report as a JSON line, stamped with `timestamp_ms`.
fn write_report(
    writer: &Mutex<BufWriter<File>>,
    timestamp: Duration,
    report: &FrameReport,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut value = serde_json::to_value(report)?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "timestamp_ms".to_string(),
            serde_json::Value::from(timestamp.as_millis() as u64),
        );
    }
    let mut writer = writer.lock().map_err(|_| "report writer lock poisoned")?;
    serde_json::to_writer(&mut *writer, &value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn run_init_config(output: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => MonitorConfig::default_path()?,
    };
    if path.exists() && !force {
        return Err(format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    MonitorConfig::default().save(&path)?;
    log::info!("Default config written to {}", path.display());
    Ok(())
}

fn run_info(
    config: &MonitorConfig,
    config_path: Option<&Path>,
    format: InfoFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = match config_path {
        Some(path) => path.display().to_string(),
        None => MonitorConfig::default_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "<none>".to_string()),
    };

    match format {
        InfoFormat::Json => {
            let info = serde_json::json!({
                "name": APP_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "description": env!("CARGO_PKG_DESCRIPTION"),
                "config_path": path,
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        InfoFormat::Yaml => print!("{}", info_yaml(config, &path)),
        InfoFormat::Table => {
            println!("{APP_NAME} {}", env!("CARGO_PKG_VERSION"));
            println!("{}", env!("CARGO_PKG_DESCRIPTION"));
            println!();
            println!("  {:24} {path}", "config_path");
            println!("  {:24} {}", "overlap_threshold", config.overlap_threshold);
            println!(
                "  {:24} {}",
                "face_overlap_threshold", config.face_overlap_threshold
            );
            println!("  {:24} {}", "closed_threshold_ms", config.closed_threshold_ms);
            println!("  {:24} {}", "channel_capacity", config.channel_capacity);
            println!("  {:24} {}", "log_level", config.log_level);
        }
    }
    Ok(())
}

/// Flat `key: value` rendering; every value is a scalar.
fn info_yaml(config: &MonitorConfig, config_path: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("name: {APP_NAME}\n"));
    out.push_str(&format!("version: {}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!("description: {}\n", env!("CARGO_PKG_DESCRIPTION")));
    out.push_str(&format!("config_path: {config_path:?}\n"));
    out.push_str("config:\n");
    out.push_str(&format!("  overlap_threshold: {}\n", config.overlap_threshold));
    out.push_str(&format!(
        "  face_overlap_threshold: {}\n",
        config.face_overlap_threshold
    ));
    out.push_str(&format!("  closed_threshold_ms: {}\n", config.closed_threshold_ms));
    out.push_str(&format!("  channel_capacity: {}\n", config.channel_capacity));
    out.push_str(&format!("  log_level: {}\n", config.log_level));
    out
}
