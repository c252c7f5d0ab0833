use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Written in place of a website or email list that could not be found.
pub const NOT_FOUND: &str = "Not found";

pub const DEFAULT_EMPLOYER: &str = "Unknown Church";
pub const DEFAULT_LOCATION: &str = "New York";

/// A job card as parsed from the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub role: String,
    pub employer: String,
    pub location: String,
}

/// A listing enriched with the employer's website and contact emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub role: String,
    pub employer: String,
    pub location: String,
    pub website: Option<String>,
    pub emails: BTreeSet<String>,
}

impl Lead {
    pub fn new(listing: JobListing, website: Option<String>, emails: BTreeSet<String>) -> Self {
        Self {
            role: listing.role,
            employer: listing.employer,
            location: listing.location,
            website,
            emails,
        }
    }

    pub fn has_contact(&self) -> bool {
        !self.emails.is_empty()
    }
}

/// CSV projection of a [`Lead`]. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRow {
    #[serde(rename = "Employer")]
    pub employer: String,
    #[serde(rename = "Emails")]
    pub emails: String,
    #[serde(rename = "Website")]
    pub website: String,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Location")]
    pub location: String,
}

pub const CSV_COLUMNS: [&str; 5] = ["Employer", "Emails", "Website", "Role", "Location"];

impl From<&Lead> for LeadRow {
    fn from(lead: &Lead) -> Self {
        let emails = if lead.emails.is_empty() {
            NOT_FOUND.to_string()
        } else {
            lead.emails.iter().cloned().collect::<Vec<_>>().join(", ")
        };

        Self {
            employer: lead.employer.clone(),
            emails,
            website: lead.website.clone().unwrap_or_else(|| NOT_FOUND.to_string()),
            role: lead.role.clone(),
            location: lead.location.clone(),
        }
    }
}

/// Outcome of one scrape run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub listings: usize,
    pub leads: usize,
    pub leads_with_email: usize,
    /// `None` when nothing was scraped and no CSV was written.
    pub output_path: Option<String>,
}
