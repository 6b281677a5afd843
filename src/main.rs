use clap::Parser;
use portside::config::StatusCliConfig;
use portside::core::{aggregate, report, StatusEngine};
use portside::domain::model::TerminalReport;
use portside::terminals::build_checker;
use portside::utils::{logger, validation::Validate};

#[tokio::main]
async fn main() {
    let config = StatusCliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting container status check");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let containers = config.normalized_containers();
    let terminals = config.terminals();

    // A terminal whose driver cannot even be built (missing credentials,
    // usually) is reported alongside the portal failures instead of
    // aborting the whole run.
    let mut checkers = Vec::new();
    let mut failed_reports = Vec::new();
    for terminal in terminals {
        match build_checker(
            terminal,
            config.headless,
            config.chrome.clone(),
            config.captcha_timeout(),
        ) {
            Ok(checker) => checkers.push(checker),
            Err(e) => {
                tracing::error!(terminal = %terminal, "❌ checker unavailable: {}", e);
                failed_reports.push(TerminalReport {
                    terminal,
                    outcome: Err(e),
                });
            }
        }
    }

    let engine = StatusEngine::new(checkers);
    let mut reports = engine.run(&containers).await;
    reports.extend(failed_reports);

    let aggregated = aggregate(reports);
    if aggregated.is_total_failure() {
        eprintln!("❌ Every terminal check failed; nothing to report");
        eprintln!("💡 See the warnings above for per-terminal reasons");
        std::process::exit(1);
    }

    if let Err(e) = report::write_report(&aggregated, config.output, config.output_file.as_deref()) {
        tracing::error!("❌ Failed to write report: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code().max(1));
    }

    tracing::info!("✅ Status check completed");
}
