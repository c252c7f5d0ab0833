use clap::Parser;
use lead_scraper::domain::ports::ConfigProvider;
use lead_scraper::utils::{logger, validation::Validate};
use lead_scraper::{CliConfig, EtlEngine, LeadError, LeadPipeline, LocalStorage};

fn exit_with(e: &LeadError) -> ! {
    tracing::error!(
        "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting lead-scraper");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = match LeadPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(&e),
    };

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => match report.output_path {
            Some(path) => {
                println!(
                    "\n✅ SUCCESS: CSV '{}' written with {} rows ({} with emails).",
                    path, report.leads, report.leads_with_email
                );
            }
            None => println!("⚠️ No results found."),
        },
        Err(e) => exit_with(&e),
    }

    Ok(())
}
