use anyhow::Context;
use clap::Parser;
use lead_scraper::config::toml_config::{LogFormat, TomlConfig};
use lead_scraper::core::Pipeline;
use lead_scraper::domain::ports::ConfigProvider;
use lead_scraper::utils::{logger, validation::Validate};
use lead_scraper::{EtlEngine, LeadError, LeadPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-scraper")]
#[command(about = "Lead scraper driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "scraper.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the number of listings to enrich
    #[arg(long)]
    max_listings: Option<usize>,

    /// Fetch and print listings without searching websites or writing a CSV
    #[arg(long)]
    dry_run: bool,
}

fn report_error(e: &LeadError) -> i32 {
    tracing::error!(
        "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    e.exit_code()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    match config.log_format() {
        LogFormat::Json => logger::init_json_logger(args.verbose),
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
    }

    tracing::info!("🚀 Starting TOML-based lead scraper");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Some(max) = args.max_listings {
        config.enrich.max_listings = Some(max);
        tracing::info!("🔧 max_listings overridden to: {}", max);
    }

    if let Err(e) = config.validate() {
        std::process::exit(report_error(&e));
    }

    display_config_summary(&config);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = match LeadPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => std::process::exit(report_error(&e)),
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - listings only, no enrichment or output");
        let listings = pipeline
            .extract()
            .await
            .context("listing extraction failed")?;
        println!("{} listings:", listings.len());
        for (index, listing) in listings.iter().enumerate() {
            println!(
                "  {:>3}. {} | {} | {}",
                index + 1,
                listing.role,
                listing.employer,
                listing.location
            );
        }
        return Ok(());
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => match report.output_path {
            Some(path) => {
                tracing::info!("✅ Scrape completed: {} leads", report.leads);
                println!(
                    "\n✅ SUCCESS: CSV '{}' written with {} rows ({} with emails).",
                    path, report.leads, report.leads_with_email
                );
            }
            None => println!("⚠️ No results found."),
        },
        Err(e) => std::process::exit(report_error(&e)),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Pipeline: {}", config.pipeline.name);
    if let Some(description) = &config.pipeline.description {
        tracing::info!("   {}", description);
    }
    tracing::info!("🌐 Listing endpoint: {}", config.listing_endpoint());
    for (key, value) in config.listing_params() {
        tracing::info!("   {} = {}", key, value);
    }
    tracing::info!("🔎 Search provider: {}", config.search_provider());
    tracing::info!(
        "⏱️ Delay between listings: {:?}, request timeout: {:?}",
        config.listing_delay(),
        config.request_timeout()
    );
    if let Some(max) = config.max_listings() {
        tracing::info!("🔢 Max listings: {}", max);
    }
    tracing::info!(
        "💾 Output: {}/{}",
        config.output_path(),
        config.output_file()
    );
}
