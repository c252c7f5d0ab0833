use crate::adapters::{http, search};
use crate::core::emails::EmailExtractor;
use crate::core::listing::parse_listings;
use crate::core::{ConfigProvider, JobListing, Lead, Pipeline, SearchProvider, Storage};
use crate::domain::model::LeadRow;
use crate::utils::error::{LeadError, Result};
use reqwest::Client;
use std::collections::BTreeSet;

/// Scrapes the listing page, enriches every listing in order, writes one CSV.
pub struct LeadPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    search: Box<dyn SearchProvider>,
    emails: EmailExtractor,
}

impl<S: Storage, C: ConfigProvider> LeadPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = http::build_client(config.user_agent(), config.request_timeout())?;
        let search = search::provider_for(
            config.search_provider(),
            config.search_endpoint(),
            config.search_api_key(),
            client.clone(),
        )?;

        Ok(Self::with_search_provider(storage, config, client, search))
    }

    pub fn with_search_provider(
        storage: S,
        config: C,
        client: Client,
        search: Box<dyn SearchProvider>,
    ) -> Self {
        let emails = EmailExtractor::new(config.extra_email_denylist());
        Self {
            storage,
            config,
            client,
            search,
            emails,
        }
    }

    async fn fetch_listing_page(&self) -> Result<String> {
        let response = self
            .client
            .get(self.config.listing_endpoint())
            .query(&self.config.listing_params())
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!("Listing page status: {}", response.status());
        Ok(response.text().await?)
    }

    /// First search hit for the employer, `None` on any failure.
    pub async fn resolve_website(&self, listing: &JobListing) -> Option<String> {
        let query = search::build_query(
            self.config.query_template(),
            &listing.employer,
            &listing.location,
        );

        match self.search.first_result(&query).await {
            Ok(Some(url)) => {
                tracing::debug!("🌐 {} -> {}", listing.employer, url);
                Some(url)
            }
            Ok(None) => {
                tracing::info!("No {} results for {}", self.search.name(), listing.employer);
                None
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not search website for {}: {}", listing.employer, e);
                None
            }
        }
    }

    /// Emails found on the page at `url`; empty on any failure.
    pub async fn fetch_emails(&self, url: &str) -> BTreeSet<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Could not fetch {}: {}", url, e);
                return BTreeSet::new();
            }
        };

        // Status is not checked; error pages are scanned as well.
        let status = response.status();
        match response.text().await {
            Ok(html) => {
                let emails = self.emails.extract_from_html(&html);
                tracing::debug!("{} ({}) yielded {} emails", url, status, emails.len());
                emails
            }
            Err(e) => {
                tracing::debug!("Could not read body of {}: {}", url, e);
                BTreeSet::new()
            }
        }
    }

    async fn enrich(&self, listing: JobListing) -> Lead {
        let website = self.resolve_website(&listing).await;
        let emails = match &website {
            Some(url) => self.fetch_emails(url).await,
            None => BTreeSet::new(),
        };
        Lead::new(listing, website, emails)
    }
}

/// Serializes leads with a header row in the fixed column order.
pub fn leads_to_csv(leads: &[Lead]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for lead in leads {
        writer.serialize(LeadRow::from(lead))?;
    }
    writer
        .into_inner()
        .map_err(|e| LeadError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LeadPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<JobListing>> {
        tracing::info!(
            "🔍 Searching listings at {}",
            self.config.listing_endpoint()
        );

        let html = match self.fetch_listing_page().await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("❌ Could not fetch listing page: {}", e);
                return Ok(Vec::new());
            }
        };

        let mut listings = parse_listings(
            &html,
            self.config.fallback_employer(),
            self.config.fallback_location(),
        );

        if let Some(max) = self.config.max_listings() {
            listings.truncate(max);
        }

        tracing::info!(
            "   -> Found {} possible leads, starting enrichment",
            listings.len()
        );
        Ok(listings)
    }

    async fn transform(&self, listings: Vec<JobListing>) -> Result<Vec<Lead>> {
        let total = listings.len();
        let delay = self.config.listing_delay();
        let mut leads = Vec::with_capacity(total);

        for (index, listing) in listings.into_iter().enumerate() {
            tracing::info!("   ⚡️ [{}/{}] Processing: {}", index + 1, total, listing.employer);
            leads.push(self.enrich(listing).await);

            if index + 1 < total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(leads)
    }

    async fn load(&self, leads: Vec<Lead>) -> Result<String> {
        let data = leads_to_csv(&leads)?;
        let output_file = self.config.output_file();

        tracing::debug!("Writing {} rows ({} bytes) to {}", leads.len(), data.len(), output_file);
        self.storage.write_file(output_file, &data).await?;

        let output_path = std::path::Path::new(self.config.output_path())
            .join(output_file)
            .display()
            .to_string();
        tracing::info!("💾 CSV written: {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::TomlConfig;
    use crate::domain::model::{CSV_COLUMNS, NOT_FOUND};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct NullStorage;

    impl Storage for NullStorage {
        async fn write_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    /// Records queries and never finds a website.
    struct RecordingSearch {
        queries: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl SearchProvider for RecordingSearch {
        fn name(&self) -> &str {
            "recording"
        }

        async fn first_result(&self, query: &str) -> Result<Option<String>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(None)
        }
    }

    fn listing(employer: &str) -> JobListing {
        JobListing {
            role: "Worship Leader".to_string(),
            employer: employer.to_string(),
            location: "Brooklyn, NY".to_string(),
        }
    }

    fn lead(website: Option<&str>, emails: &[&str]) -> Lead {
        Lead::new(
            JobListing {
                role: "Worship Leader".to_string(),
                employer: "Grace Church".to_string(),
                location: "Brooklyn, NY".to_string(),
            },
            website.map(String::from),
            emails.iter().map(|e| e.to_string()).collect(),
        )
    }

    #[test]
    fn test_csv_has_fixed_columns() {
        let data = leads_to_csv(&[lead(Some("https://grace.org"), &["a@grace.org"])]).unwrap();
        let mut reader = csv::Reader::from_reader(data.as_slice());

        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_COLUMNS);

        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "Grace Church");
        assert_eq!(&row[1], "a@grace.org");
        assert_eq!(&row[2], "https://grace.org");
        assert_eq!(&row[3], "Worship Leader");
        assert_eq!(&row[4], "Brooklyn, NY");
    }

    #[test]
    fn test_csv_quotes_joined_emails_and_marks_absence() {
        let data = leads_to_csv(&[
            lead(Some("https://grace.org"), &["a@grace.org", "b@grace.org"]),
            lead(None, &[]),
        ])
        .unwrap();
        let text = String::from_utf8(data).unwrap();

        assert!(text.contains("\"a@grace.org, b@grace.org\""));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[1][1], NOT_FOUND);
        assert_eq!(&rows[1][2], NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transform_waits_between_listings_only() {
        let config = TomlConfig::from_toml_str(
            r#"
[pipeline]
name = "delay"

[search]
query_template = "{employer}"

[enrich]
delay_ms = 1000

[load]
output_path = "./output"
"#,
        )
        .unwrap();
        let queries = Arc::new(Mutex::new(Vec::new()));
        let search = RecordingSearch {
            queries: Arc::clone(&queries),
        };
        let client = http::build_client("test-agent", Duration::from_secs(5)).unwrap();
        let pipeline =
            LeadPipeline::with_search_provider(NullStorage, config, client, Box::new(search));

        let started = tokio::time::Instant::now();
        let leads = pipeline
            .transform(vec![listing("Grace"), listing("Hillside"), listing("Trinity")])
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(2), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "elapsed {:?}", elapsed);
        assert_eq!(*queries.lock().unwrap(), vec!["Grace", "Hillside", "Trinity"]);
        assert_eq!(leads.len(), 3);
        assert!(leads.iter().all(|lead| lead.website.is_none()));
    }
}
