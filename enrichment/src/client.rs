//! Person directory client.
//!
//! Two sequential calls per name: a Bearer-authenticated person search
//! picks the best textual hit, then a keyed detail lookup fetches the
//! biography. The merged payload becomes a [`ProfileRecord`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EnrichError, Result};

/// Default directory endpoint.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// External metadata for one matched identity.
///
/// Fetched per result; never cached, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Directory identifier.
    pub id: i64,

    /// Display name as the directory knows it.
    pub name: String,

    /// Biography text; empty when the directory has none.
    pub biography: String,

    /// Field of work, e.g. "Acting".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_for_department: Option<String>,

    /// Directory popularity score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,

    /// Relative path of the profile image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

/// Person-search response body.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<PersonHit>,
}

#[derive(Debug, Deserialize)]
struct PersonHit {
    id: i64,
    name: String,
    known_for_department: Option<String>,
    popularity: Option<f64>,
    profile_path: Option<String>,
}

/// Person-detail response body; only the biography is merged in.
#[derive(Debug, Deserialize)]
struct PersonDetail {
    biography: Option<String>,
}

/// Gateway to the external person directory.
pub struct PersonDirectory {
    base_url: String,
    /// Bearer token for the search endpoint.
    api_key: String,
    /// Query-string key for the detail endpoint.
    bio_key: String,
    client: reqwest::Client,
}

impl PersonDirectory {
    /// Create a gateway using the production endpoint.
    pub fn new(api_key: impl Into<String>, bio_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            bio_key: bio_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the gateway at a different endpoint. Test hook.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Expand each name into a profile record, preserving input order.
    ///
    /// A name that cannot be resolved (no search hit, network failure,
    /// malformed response) is omitted from the output; one unresolvable
    /// identity must not block the rest of the batch. No retries.
    pub async fn enrich(&self, names: &[String]) -> Vec<ProfileRecord> {
        let mut records = Vec::with_capacity(names.len());

        for name in names {
            match self.lookup(name).await {
                Ok(record) => records.push(record),
                Err(e) => warn!("Enrichment failed for {name}: {e}"),
            }
        }

        records
    }

    /// Resolve one name: search, then biography, merged.
    pub async fn lookup(&self, name: &str) -> Result<ProfileRecord> {
        let hit = self.search(name).await?;
        let biography = self.fetch_biography(hit.id).await?;

        debug!("Resolved {name} to directory id {}", hit.id);
        Ok(ProfileRecord {
            id: hit.id,
            name: hit.name,
            biography,
            known_for_department: hit.known_for_department,
            popularity: hit.popularity,
            profile_path: hit.profile_path,
        })
    }

    async fn search(&self, name: &str) -> Result<PersonHit> {
        let response = self
            .client
            .get(format!("{}/search/person", self.base_url))
            .query(&[
                ("query", name),
                ("include_adult", "false"),
                ("language", "en-US"),
                ("page", "1"),
            ])
            .header("accept", "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnrichError::Request(response.status().as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::InvalidResponse(e.to_string()))?;

        body.results
            .into_iter()
            .next()
            .ok_or_else(|| EnrichError::NoMatch(name.to_string()))
    }

    async fn fetch_biography(&self, id: i64) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/person/{id}", self.base_url))
            .query(&[("api_key", self.bio_key.as_str()), ("language", "en-US")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnrichError::Request(response.status().as_u16()));
        }

        let detail: PersonDetail = response
            .json()
            .await
            .map_err(|e| EnrichError::InvalidResponse(e.to_string()))?;

        Ok(detail.biography.unwrap_or_default())
    }
}
