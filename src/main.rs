use std::path::PathBuf;

use enroll_wizard::config::WizardConfig;
use enroll_wizard::host::CatalogTranslator;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let config = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("enroll-wizard: {:#}", e);
            std::process::exit(2);
        }
    };

    let translator = match load_translator(&args) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("enroll-wizard: {:#}", e);
            std::process::exit(2);
        }
    };

    // Non-interactive smoke mode (for automated checks).
    // Renders a single frame for a specific step and exits 0.
    // Usage: --smoke or --smoke=2
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--smoke" || a.starts_with("--smoke="))
    {
        let step = arg
            .split_once('=')
            .and_then(|(_, v)| v.trim().parse::<usize>().ok());
        if let Err(e) = enroll_wizard::run_smoke(config, translator, step) {
            eprintln!("enroll-wizard: smoke render failed: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = enroll_wizard::run_wizard(config, translator) {
        eprintln!("enroll-wizard: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &[String]) -> anyhow::Result<WizardConfig> {
    match flag_value(args, "--config") {
        Some(path) => WizardConfig::load(&PathBuf::from(path)),
        None => Ok(WizardConfig::default()),
    }
}

fn load_translator(args: &[String]) -> anyhow::Result<CatalogTranslator> {
    match flag_value(args, "--translations") {
        Some(path) => CatalogTranslator::load(&PathBuf::from(path)),
        None => Ok(CatalogTranslator::new()),
    }
}

/// Accepts both `--flag=value` and `--flag value`.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    for (i, arg) in args.iter().enumerate() {
        if let Some((name, value)) = arg.split_once('=') {
            if name == flag {
                return Some(value.to_string());
            }
        } else if arg == flag {
            return args.get(i + 1).cloned();
        }
    }
    None
}
