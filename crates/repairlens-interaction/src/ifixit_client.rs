//! HTTP client for the iFixit public API.

use async_trait::async_trait;
use repairlens_core::collaborator::GuideLookup;
use repairlens_core::guide::{DeviceMatch, GuideDetail, GuideSummary};
use repairlens_core::{RepairError, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Guide repository client against the iFixit 2.0 API.
///
/// Transport failures and non-success statuses degrade to "not found";
/// only decode failures surface as errors.
#[derive(Debug, Clone)]
pub struct IFixitClient {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DeviceMatch>,
}

#[derive(Deserialize)]
struct CategoryWiki {
    #[serde(default)]
    guides: Vec<GuideSummary>,
}

impl IFixitClient {
    /// Creates a client against the given API base URL
    /// (e.g. `https://www.ifixit.com/api/2.0`).
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|err| {
            RepairError::config(format!("Invalid guide API URL '{base_url}': {err}"))
        })?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RepairError::config("Guide API URL cannot be a base"))?
            .extend(segments);
        Ok(url)
    }

    /// GETs a URL, returning `Ok(None)` on transport errors and non-success
    /// statuses so lookups degrade to "not found".
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Guide repository unreachable at {url}: {err}");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "Guide repository returned {} for {url}",
                response.status()
            );
            return Ok(None);
        }

        let value = response
            .json::<T>()
            .await
            .map_err(|err| RepairError::schema("guide repository response", err.to_string()))?;
        Ok(Some(value))
    }
}

#[async_trait]
impl GuideLookup for IFixitClient {
    async fn find_best_device(&self, name: &str) -> Result<Option<DeviceMatch>> {
        let mut url = self.endpoint(&["search", name])?;
        // 'filter=category' finds device categories, not individual guides
        url.query_pairs_mut()
            .append_pair("filter", "category")
            .append_pair("limit", "1");

        let found: Option<SearchResponse> = self.get_json(url).await?;
        Ok(found.and_then(|response| response.results.into_iter().next()))
    }

    async fn guides_for(&self, category: &str) -> Result<Vec<GuideSummary>> {
        let url = self.endpoint(&["wikis", "CATEGORY", category])?;
        let wiki: Option<CategoryWiki> = self.get_json(url).await?;
        Ok(wiki.map(|w| w.guides).unwrap_or_default())
    }

    async fn guide_detail(&self, guide_id: u64) -> Result<GuideDetail> {
        let url = self.endpoint(&["guides", &guide_id.to_string()])?;
        let detail: Option<GuideDetail> = self.get_json(url).await?;
        Ok(detail.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_percent_encodes_device_names() {
        let client = IFixitClient::new("https://www.ifixit.com/api/2.0").unwrap();
        let url = client.endpoint(&["search", "Sunbeam Toaster"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.ifixit.com/api/2.0/search/Sunbeam%20Toaster"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let client = IFixitClient::new("http://localhost:9000/api/2.0/").unwrap();
        let url = client.endpoint(&["guides", "42"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/2.0/guides/42");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = IFixitClient::new("not a url").unwrap_err();
        assert!(matches!(err, RepairError::Config(_)));
    }

    #[test]
    fn search_response_tolerates_missing_results() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }
}
