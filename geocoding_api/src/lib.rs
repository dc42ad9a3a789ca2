use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Client,
};
use serde::{Deserialize, Deserializer, Serialize};

pub mod error;

pub use error::{GeocodingError, Translatable};

const BASE_URL: &str = "https://geocode.maps.co";
pub const REVERSE_ENDPOINT: &str = "/reverse";
pub const SEARCH_ENDPOINT: &str = "/search";

/// Maximum number of candidates returned by [`GeocodingClient::search_location`]
pub const SEARCH_LIMIT: usize = 5;

/// Base url of the geocoding service, `GEOCODING_BASE_URL` overrides the default
pub fn get_base_url() -> String {
    std::env::var("GEOCODING_BASE_URL").unwrap_or_else(|_| BASE_URL.to_string())
}

/// A candidate location returned by a forward lookup.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct ReverseResponse {
    pub display_name: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResponseItem {
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lon: f64,
    pub display_name: String,
}

impl From<SearchResponseItem> for Location {
    fn from(item: SearchResponseItem) -> Self {
        Self {
            lat: item.lat,
            lng: item.lon,
            address: item.display_name,
        }
    }
}

/// Nominatim style APIs send coordinates as strings, some proxies send numbers
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s.trim().parse().map_err(D::Error::custom),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("Invalid coordinate `{n}`"))),
        other => Err(D::Error::custom(format!("Invalid coordinate `{other}`"))),
    }
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeocodingClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("geopins"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Looks up a human readable address for a coordinate pair.
    ///
    /// Fails with [`GeocodingError::AddressNotFound`] when the service answers
    /// without a display name and with [`GeocodingError::FailedToGetAddress`]
    /// for any transport, status or decoding failure.
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<String, GeocodingError> {
        let response = self.fetch_reverse(lat, lng).await.map_err(|e| {
            log::error!("Geocoding error: {e}");
            GeocodingError::FailedToGetAddress
        })?;

        match response.display_name.filter(|name| !name.trim().is_empty()) {
            Some(name) => Ok(name),
            None => {
                log::warn!(
                    "No address for ({lat}, {lng}): {}",
                    response.error.as_deref().unwrap_or("empty response")
                );
                Err(GeocodingError::AddressNotFound)
            }
        }
    }

    /// Resolves free text into at most [`SEARCH_LIMIT`] candidate locations,
    /// in the order the service ranked them.
    pub async fn search_location(&self, query: &str) -> Result<Vec<Location>, GeocodingError> {
        let items = self.fetch_search(query).await.map_err(|e| {
            log::error!("Search error: {e}");
            GeocodingError::FailedToFindLocation
        })?;

        if items.is_empty() {
            log::info!("No locations found for `{query}`");
            return Err(GeocodingError::LocationNotFound);
        }

        Ok(items
            .into_iter()
            .take(SEARCH_LIMIT)
            .map(Location::from)
            .collect())
    }

    async fn fetch_reverse(&self, lat: f64, lng: f64) -> anyhow::Result<ReverseResponse> {
        let mut query = vec![
            ("lat", lat.to_string()),
            ("lon", lng.to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(ref key) = self.api_key {
            query.push(("api_key", key.clone()));
        }

        let res = self
            .client
            .get(format!("{}{REVERSE_ENDPOINT}", self.base_url))
            .query(&query)
            .send()
            .await?;

        if !res.status().is_success() {
            anyhow::bail!("Unexpected response code: {}", res.status());
        }

        Ok(res.json::<ReverseResponse>().await?)
    }

    async fn fetch_search(&self, query: &str) -> anyhow::Result<Vec<SearchResponseItem>> {
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
        ];
        if let Some(ref key) = self.api_key {
            params.push(("api_key", key.clone()));
        }

        let res = self
            .client
            .get(format!("{}{SEARCH_ENDPOINT}", self.base_url))
            .query(&params)
            .send()
            .await?;

        if !res.status().is_success() {
            anyhow::bail!("Unexpected response code: {}", res.status());
        }

        Ok(res.json::<Vec<SearchResponseItem>>().await?)
    }
}
