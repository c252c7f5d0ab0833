use crate::core::{Pipeline, RunReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs extract, transform and load. Nothing is written when the listing
    /// page produced no listings.
    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting lead scrape");
        self.monitor.log_stats("Start");

        let listings = self.pipeline.extract().await?;
        let listing_count = listings.len();
        self.monitor.log_stats("Extract");

        if listings.is_empty() {
            tracing::warn!("⚠️ No listings found, skipping enrichment and output");
            self.monitor.log_final_stats();
            return Ok(RunReport {
                listings: 0,
                leads: 0,
                leads_with_email: 0,
                output_path: None,
            });
        }

        let leads = self.pipeline.transform(listings).await?;
        let lead_count = leads.len();
        let leads_with_email = leads.iter().filter(|lead| lead.has_contact()).count();
        tracing::info!(
            "Enriched {} leads, {} with at least one email",
            lead_count,
            leads_with_email
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(leads).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunReport {
            listings: listing_count,
            leads: lead_count,
            leads_with_email,
            output_path: Some(output_path),
        })
    }
}
