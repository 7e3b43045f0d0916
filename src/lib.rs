// Multi-step enrollment wizard
// Main library entry point

pub mod config;
pub mod error;
pub mod host;
pub mod tui;
pub mod utils;
pub mod wizard;

use std::path::PathBuf;

use log::info;

use crate::config::WizardConfig;
use crate::host::CatalogTranslator;

/// Initialize logging with dual format (JSON + human-readable).
///
/// - JSON format to a `.log` file for structured parsing
/// - Human-readable format to a `.txt` file
/// - Optional human-readable stdout (disabled while the TUI owns the terminal)
fn init_logging(with_stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = resolve_log_folder();
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");
    let json_log_file = log_dir.join(format!("wizard-{}.log", timestamp));
    let txt_log_file = log_dir.join(format!("wizard-{}.txt", timestamp));

    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (step, cleaned_message) = utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (step, cleaned_message) = utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (step, cleaned_message) = utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", txt_line));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    info!("Logging initialized, log directory: {:?}", log_dir);
    Ok(())
}

fn resolve_log_folder() -> PathBuf {
    // Prefer a logs/ folder next to the executable, fall back to the cwd.
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(dir) = exe_path.parent() {
            return dir.join("logs");
        }
    }
    PathBuf::from("logs")
}

/// Run the interactive terminal wizard. Logging goes to files only, so the
/// terminal stays clean for the UI.
pub fn run_wizard(config: WizardConfig, translator: CatalogTranslator) -> anyhow::Result<()> {
    init_logging(false).map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;
    info!("Starting enrollment wizard ({} steps)", config.step_count());
    tui::run(config, translator)
}

/// Render a single frame for the given step and print it to stdout.
/// Used by automated checks; no terminal is taken over.
pub fn run_smoke(
    config: WizardConfig,
    translator: CatalogTranslator,
    step: Option<usize>,
) -> anyhow::Result<()> {
    tui::smoke(config, translator, step)
}
