use clap::Parser;
use portside::config::{wms_config_from_env, WmsCliConfig};
use portside::domain::model::SubmissionOutcome;
use portside::domain::ports::WmsPortal;
use portside::utils::{logger, validation::Validate};
use portside::wms::{SubmissionBatch, WmsSession};

#[tokio::main]
async fn main() {
    let config = WmsCliConfig::parse();

    logger::init_cli_logger(config.verbose);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let records = match config.records() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };

    let wms_config = match wms_config_from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };

    let session = match WmsSession::launch(wms_config, config.headless, config.chrome.clone()).await
    {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };

    if let Err(e) = session.login().await {
        tracing::error!("❌ WMS login failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        session.close().await;
        std::process::exit(e.exit_code().max(1));
    }

    if config.query {
        match session.export_inventory().await {
            Ok(path) => println!("✅ Inventory exported to {}", path),
            Err(e) => {
                eprintln!("❌ Inventory export failed: {}", e);
                session.close().await;
                std::process::exit(e.exit_code().max(1));
            }
        }
        session.close().await;
        return;
    }

    let batch = SubmissionBatch::new(&session);
    let (results, summary) = batch.run(&records).await;
    session.close().await;

    for result in &results {
        match &result.outcome {
            SubmissionOutcome::Failed(_) => {
                eprintln!("❌ container {}: {}", result.container, result.outcome)
            }
            _ => println!("container {}: {}", result.container, result.outcome),
        }
    }
    println!(
        "\n✅ {} submitted, {} skipped, {} failed ({} total)",
        summary.submitted,
        summary.skipped,
        summary.failed,
        summary.total()
    );
}
