//! CLI entry point.
//!
//! # Responsibility
//! - Bootstrap configuration, logging and the simulated service.
//! - Load one app record and replay editor commands given as arguments.

mod view;

use appform_core::{
    core_version, default_log_level, init_logging, AppConfig, AppData, AppId, AppStore,
    EditCommand, InMemoryAppService, LogSaveObserver, SaveLedger, SaveObserver, SaveReport,
    DEFAULT_RECORD_ID, DEFAULT_SERVICE_LATENCY,
};
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

/// Load one app record, replay edits against it and auto-save every change
#[derive(Parser, Debug)]
#[command(name = "appform")]
#[command(version)]
struct Cli {
    /// Edits to replay in order: `title=<text>`, `headline=<text>`,
    /// `private=true|false` or `toggle-private`
    #[arg(value_parser = EditCommand::parse)]
    commands: Vec<EditCommand>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "APPFORM_LOG_LEVEL", default_value = default_log_level())]
    log_level: String,

    /// Absolute directory for rolling log files; file logging is off without it
    #[arg(long, env = "APPFORM_LOG_DIR")]
    log_dir: Option<String>,

    /// Artificial delay of every simulated service call, in milliseconds
    #[arg(
        long,
        env = "APPFORM_LATENCY_MS",
        default_value_t = DEFAULT_SERVICE_LATENCY.as_millis() as u64
    )]
    latency_ms: u64,

    /// Id of the app record to load
    #[arg(long, env = "APPFORM_RECORD_ID", default_value_t = DEFAULT_RECORD_ID)]
    record_id: AppId,
}

impl Cli {
    fn config(&self) -> AppConfig {
        AppConfig {
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
            service_latency: Duration::from_millis(self.latency_ms),
            record_id: self.record_id,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("appform: logging disabled: {err}");
        }
    }
    info!(
        "event=cli_start module=cli status=ok version={} record_id={}",
        core_version(),
        config.record_id
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("appform: failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    LocalSet::new().block_on(&runtime, run(config, cli.commands))
}

async fn run(config: AppConfig, commands: Vec<EditCommand>) -> ExitCode {
    let service = Rc::new(InMemoryAppService::with_examples(config.service_latency));
    let ledger = SaveLedger::new();
    let observer = Rc::new(Tee {
        ledger: Rc::clone(&ledger),
    });
    let store = AppStore::new(service, config.record_id, observer);

    println!("{}\n", view::render(&store.snapshot()));
    if let Err(err) = store.wait_loaded().await {
        error!("event=cli_load module=cli status=error error={}", err);
        eprintln!("appform: {err}");
        return ExitCode::FAILURE;
    }
    println!("{}\n", view::render(&store.snapshot()));

    for command in &commands {
        if store.apply(command) {
            println!("{}\n", view::render(&store.snapshot()));
        }
    }
    store.flush_saves().await;

    for report in ledger.reports() {
        let status = match &report.outcome {
            Ok(()) => "saved".to_string(),
            Err(err) => format!("failed: {err}"),
        };
        println!("save #{} (app {}): {}", report.seq, report.id, status);
    }
    match serde_json::to_string_pretty(&store.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("appform: cannot encode snapshot: {err}"),
    }

    if ledger.failures().is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Logs save activity and records it for the final summary.
struct Tee {
    ledger: Rc<SaveLedger>,
}

impl SaveObserver for Tee {
    fn on_save_issued(&self, seq: u64, app: &AppData) {
        LogSaveObserver.on_save_issued(seq, app);
        self.ledger.on_save_issued(seq, app);
    }

    fn on_save_settled(&self, report: &SaveReport) {
        LogSaveObserver.on_save_settled(report);
        self.ledger.on_save_settled(report);
    }
}
