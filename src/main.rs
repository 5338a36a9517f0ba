use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

use dd_monitor_sync::checklist::{detect_gaps, read_report, write_report};
use dd_monitor_sync::workbook::{
    load_workbook, monitor_rows, ConfigEnvironment, Workbook, WorkbookSource, ALERT_SHEET, CONFIG_SHEET,
    CREATE_SHEET, DELETE_COLUMNS, DELETE_SHEET, MONITOR_COLUMNS, UPDATE_SHEET,
};
use dd_monitor_sync::{
    failure_log_path, load_config, plan_checklist, require_credentials, Config, DatadogClient, MonitorApi,
    ReconciliationEngine, ReconciliationReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Command {
    /// Check the API and application keys
    Validate,
    /// Report unfilled checklist cells and create their templated monitors
    Check,
    /// Create monitors from the `create` sheet
    Create,
    /// Update monitors named in the `update` sheet
    Update,
    /// Delete monitors named in the `delete` sheet
    Delete,
}

#[derive(Debug, Parser)]
#[command(name = "dd-monitor-sync", version, about = "Keep Datadog monitors in sync with an alert workbook")]
struct Cli {
    #[arg(value_enum)]
    command: Command,

    /// Workbook path, or `-` to read the workbook from stdin
    #[arg(long)]
    workbook: Option<String>,

    /// Where the check command writes its gap report
    #[arg(long)]
    gap_report: Option<PathBuf>,

    /// Render checklist monitors without creating them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = load_config()?;
    info!("command = {:?}, api = {}", cli.command, cfg.api_url);

    if cli.command == Command::Validate {
        return validate(&cfg).await;
    }

    let (source, workbook_path) = workbook_source(&cli, &cfg).await?;
    let wb = load_workbook(&source).context("loading workbook")?;
    info!("sheets loaded: {:?}", wb.sheet_names());

    let report = match cli.command {
        Command::Check => match check(&cli, &cfg, &wb).await? {
            Some(report) => report,
            None => return Ok(ExitCode::SUCCESS),
        },
        Command::Create => {
            let rows = monitor_rows(wb.require_sheet(CREATE_SHEET)?, &MONITOR_COLUMNS)?;
            let client = client(&cfg)?;
            ReconciliationEngine::new(&client).create(&rows).await
        }
        Command::Update => {
            let rows = monitor_rows(wb.require_sheet(UPDATE_SHEET)?, &MONITOR_COLUMNS)?;
            let client = client(&cfg)?;
            ReconciliationEngine::new(&client).update(&rows).await
        }
        Command::Delete => {
            let rows = monitor_rows(wb.require_sheet(DELETE_SHEET)?, &DELETE_COLUMNS)?;
            let client = client(&cfg)?;
            ReconciliationEngine::new(&client).delete(&rows).await
        }
        Command::Validate => return validate(&cfg).await,
    };

    finish(&report, workbook_path.as_deref())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

fn client(cfg: &Config) -> Result<DatadogClient> {
    require_credentials(cfg)?;
    Ok(DatadogClient::new(cfg)?)
}

async fn validate(cfg: &Config) -> Result<ExitCode> {
    let client = client(cfg)?;
    if client.validate_credentials().await? {
        info!("credentials are valid for {}", client.base_url());
        Ok(ExitCode::SUCCESS)
    } else {
        error!("credentials were rejected by {}", client.base_url());
        Ok(ExitCode::FAILURE)
    }
}

async fn workbook_source(cli: &Cli, cfg: &Config) -> Result<(WorkbookSource, Option<PathBuf>)> {
    match cli.workbook.as_deref() {
        Some("-") => {
            let mut buffer = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buffer)
                .await
                .context("reading workbook from stdin")?;
            info!("received {} bytes from stdin", buffer.len());
            Ok((WorkbookSource::Bytes(buffer), None))
        }
        Some(path) => Ok((WorkbookSource::Path(PathBuf::from(path)), Some(PathBuf::from(path)))),
        None => Ok((
            WorkbookSource::Path(cfg.workbook_path.clone()),
            Some(cfg.workbook_path.clone()),
        )),
    }
}

async fn check(cli: &Cli, cfg: &Config, wb: &Workbook) -> Result<Option<ReconciliationReport>> {
    let alert = wb.require_sheet(ALERT_SHEET)?;
    let config_env = match wb.sheet(CONFIG_SHEET) {
        Some(table) => ConfigEnvironment::from_table(table),
        None => {
            warn!("sheet '{}' not found, every environment resolves empty", CONFIG_SHEET);
            ConfigEnvironment::default()
        }
    };
    if let Some(dump) = &cfg.config_dump_path {
        config_env.write_dump(dump)?;
        info!("config dump written to {}", dump.display());
    }

    let gap_path = cli.gap_report.clone().unwrap_or_else(|| cfg.gap_report_path.clone());
    let gaps = detect_gaps(alert);
    write_report(&gap_path, &gaps)?;
    info!("{} missing checkmarks written to {}", gaps.len(), gap_path.display());

    let entries = read_report(&gap_path)?;
    if cli.dry_run {
        for planned in plan_checklist(&entries, &config_env) {
            match &planned.definition {
                Ok(def) => info!(
                    "would create '{}' for {} ({}): {}",
                    def.name, planned.entry.cell, planned.entry.header_label, def.query
                ),
                Err(err) => warn!("{}: {}", planned.entry.cell, err),
            }
        }
        return Ok(None);
    }

    let client = client(cfg)?;
    Ok(Some(ReconciliationEngine::new(&client).check(&entries, &config_env).await))
}

fn finish(report: &ReconciliationReport, workbook: Option<&Path>) -> Result<ExitCode> {
    let summary = report.summary();
    info!("{} finished: {}", report.operation, summary);
    if !summary.has_failures() {
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(path) = workbook {
        let log_path = failure_log_path(path);
        report.write_failure_log(&log_path)?;
        info!("logged {} failed rows to {}", summary.failed(), log_path.display());
    }
    Ok(ExitCode::FAILURE)
}
