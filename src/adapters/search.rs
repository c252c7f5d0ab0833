use crate::domain::ports::{SearchProvider, SearchProviderKind};
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

pub const DUCKDUCKGO_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

static RESULT_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.result__a").unwrap_or_else(|e| panic!("invalid result selector: {e}"))
});

/// Fills `{employer}` and `{location}` in a query template.
pub fn build_query(template: &str, employer: &str, location: &str) -> String {
    template
        .replace("{employer}", employer)
        .replace("{location}", location)
}

/// Creates the provider selected in configuration.
pub fn provider_for(
    kind: SearchProviderKind,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    client: Client,
) -> Result<Box<dyn SearchProvider>> {
    match kind {
        SearchProviderKind::Duckduckgo => Ok(Box::new(DuckDuckGoSearch::new(
            client,
            endpoint.unwrap_or(DUCKDUCKGO_ENDPOINT),
        ))),
        SearchProviderKind::Tavily => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| LeadError::MissingConfigError {
                    field: "search.api_key".to_string(),
                })?;
            Ok(Box::new(TavilySearch::new(
                client,
                endpoint.unwrap_or(TAVILY_ENDPOINT),
                api_key,
            )))
        }
    }
}

/// Keyless search against DuckDuckGo's HTML endpoint.
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    /// First organic result link on a results page, unwrapped from
    /// DuckDuckGo's `/l/?uddg=` redirect.
    pub fn first_link(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&RESULT_LINK)
            .filter_map(|a| a.value().attr("href"))
            .find_map(resolve_result_href)
    }
}

fn resolve_result_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;

    if is_duckduckgo(&url) {
        // Sponsored results point at `/y.js`; only `/l/` redirects carry organic hits.
        if !url.path().starts_with("/l/") {
            return None;
        }
        let target = url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())?;
        return resolve_result_href(&target);
    }

    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

fn is_duckduckgo(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn first_result(&self, query: &str) -> Result<Option<String>> {
        tracing::debug!("DuckDuckGo query: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?;

        // DuckDuckGo answers rate-limited clients with 202 and a captcha page.
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(LeadError::SearchError {
                provider: self.name().to_string(),
                message: format!("unexpected HTTP status {}", status),
            });
        }

        let html = response.text().await?;
        Ok(Self::first_link(&html))
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
}

/// Tavily web search API; requires an API key.
pub struct TavilySearch {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl TavilySearch {
    pub fn new(client: Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn first_result(&self, query: &str) -> Result<Option<String>> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results: 1,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LeadError::SearchError {
                provider: self.name().to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let body = response.text().await?;
        let parsed: TavilyResponse = serde_json::from_str(&body)?;
        Ok(parsed.results.into_iter().next().map(|r| r.url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn client() -> Client {
        crate::adapters::http::build_client("test-agent", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_query() {
        assert_eq!(
            build_query(
                "{employer} {location} church official website",
                "Grace Church",
                "Brooklyn, NY"
            ),
            "Grace Church Brooklyn, NY church official website"
        );
    }

    #[test]
    fn test_first_link_unwraps_redirect() {
        let html = r#"
            <div class="result">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.gracechurch.org%2Fabout&amp;rut=abc">Grace Church</a>
            </div>
            <div class="result">
              <a class="result__a" href="https://other.org/">Other</a>
            </div>
        "#;

        assert_eq!(
            DuckDuckGoSearch::first_link(html),
            Some("https://www.gracechurch.org/about".to_string())
        );
    }

    #[test]
    fn test_first_link_accepts_direct_href() {
        let html = r#"<a class="result__a" href="https://hillside.org/">Hillside</a>"#;
        assert_eq!(
            DuckDuckGoSearch::first_link(html),
            Some("https://hillside.org/".to_string())
        );
    }

    #[test]
    fn test_first_link_skips_unusable_hrefs() {
        let html = r#"
            <a class="result__a" href="javascript:void(0)">Ad</a>
            <a class="result__a" href="https://second.org/">Second</a>
        "#;
        assert_eq!(
            DuckDuckGoSearch::first_link(html),
            Some("https://second.org/".to_string())
        );
        assert_eq!(DuckDuckGoSearch::first_link("<p>No results.</p>"), None);
    }

    #[test]
    fn test_first_link_skips_sponsored_results() {
        let html = r#"
            <div class="result result--ad">
              <a class="result__a" href="https://duckduckgo.com/y.js?ad_domain=wix.com&amp;ad_provider=bingv7aa&amp;u3=https%3A%2F%2Fwww.wix.com">Build a Church Website</a>
            </div>
            <div class="result">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fgracechurch.org%2F&amp;rut=abc">Grace Church</a>
            </div>
        "#;

        assert_eq!(
            DuckDuckGoSearch::first_link(html),
            Some("https://gracechurch.org/".to_string())
        );
    }

    #[test]
    fn test_first_link_keeps_l_paths_on_other_hosts() {
        let html = r#"<a class="result__a" href="https://gracechurch.org/l/welcome">Grace</a>"#;
        assert_eq!(
            DuckDuckGoSearch::first_link(html),
            Some("https://gracechurch.org/l/welcome".to_string())
        );
    }

    #[test]
    fn test_tavily_requires_api_key() {
        let result = provider_for(SearchProviderKind::Tavily, None, Some(" "), client());
        assert!(matches!(result, Err(LeadError::MissingConfigError { .. })));

        let provider = provider_for(SearchProviderKind::Duckduckgo, None, None, client()).unwrap();
        assert_eq!(provider.name(), "duckduckgo");
    }

    #[tokio::test]
    async fn test_duckduckgo_search_against_mock() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/html/")
                .query_param("q", "Grace Church Brooklyn church official website");
            then.status(200)
                .header("Content-Type", "text/html")
                .body(r#"<a class="result__a" href="https://gracechurch.org/">Grace</a>"#);
        });

        let search = DuckDuckGoSearch::new(client(), &server.url("/html/"));
        let result = search
            .first_result("Grace Church Brooklyn church official website")
            .await
            .unwrap();

        search_mock.assert();
        assert_eq!(result, Some("https://gracechurch.org/".to_string()));
    }

    #[tokio::test]
    async fn test_duckduckgo_rate_limit_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/html/");
            then.status(202).body("<form>captcha</form>");
        });

        let search = DuckDuckGoSearch::new(client(), &server.url("/html/"));
        let result = search.first_result("anything").await;

        assert!(matches!(result, Err(LeadError::SearchError { .. })));
    }

    #[tokio::test]
    async fn test_tavily_search_against_mock() {
        let server = MockServer::start();
        let tavily_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/search")
                .json_body_partial(r#"{"api_key": "tvly-test", "max_results": 1}"#);
            then.status(200).json_body(serde_json::json!({
                "query": "Hillside Chapel",
                "results": [
                    {"title": "Hillside Chapel", "url": "https://hillsidechapel.org", "content": "", "score": 0.9},
                    {"title": "Other", "url": "https://other.org", "content": "", "score": 0.5}
                ]
            }));
        });

        let search = TavilySearch::new(client(), &server.url("/search"), "tvly-test");
        let result = search.first_result("Hillside Chapel").await.unwrap();

        tavily_mock.assert();
        assert_eq!(result, Some("https://hillsidechapel.org".to_string()));
    }

    #[tokio::test]
    async fn test_tavily_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(401).body("invalid api key");
        });

        let search = TavilySearch::new(client(), &server.url("/search"), "bad");
        let err = search.first_result("x").await.unwrap_err();

        assert!(err.to_string().contains("401"));
    }
}
