//! Map Page Source
//! Fetches the provider's web map page and extracts the embedded case data.

use crate::fetch::{FetchError, PendingRecord, RegionReport};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Public COVID-19 map of the provider.
pub const DEFAULT_SOURCE_URL: &str = "https://yandex.ru/web-maps/covid19";

static CONFIG_VIEW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class="config-view">(.+?)<"#).expect("config-view regex"));

/// Anything that can produce the raw map page.
pub trait PageSource {
    fn fetch_page(&self) -> Result<String, FetchError>;
}

/// Blocking HTTP GET of a fixed URL.
pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("covid19ru/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PageSource for HttpSource {
    fn fetch_page(&self) -> Result<String, FetchError> {
        debug!(url = %self.url, "fetching map page");
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        Ok(response.text()?)
    }
}

/// Page text held in memory; used for recorded pages and tests.
pub struct FixtureSource {
    page: String,
}

impl FixtureSource {
    pub fn new(page: impl Into<String>) -> Self {
        Self { page: page.into() }
    }
}

impl PageSource for FixtureSource {
    fn fetch_page(&self) -> Result<String, FetchError> {
        Ok(self.page.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ConfigView {
    #[serde(rename = "covidData")]
    covid_data: CovidData,
}

#[derive(Debug, Deserialize)]
struct CovidData {
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ProviderItem {
    name: String,
    cases: i64,
    cured: i64,
    deaths: i64,
    coordinates: Option<[f64; 2]>,
    #[serde(default)]
    histogram: Option<Vec<serde_json::Value>>,
}

/// The JSON text under the `config-view` marker.
pub fn extract_config(page: &str) -> Result<&str, FetchError> {
    CONFIG_VIEW
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(FetchError::Extraction)
}

/// Russian entries of the embedded data, keyed by provider name.
pub fn parse_regions(config: &str) -> Result<BTreeMap<String, RegionReport>, FetchError> {
    let view: ConfigView = serde_json::from_str(config)?;

    let mut regions = BTreeMap::new();
    for item in view.covid_data.items {
        let is_russian = item.get("ru").and_then(|v| v.as_bool()).unwrap_or(false);
        if !is_russian {
            continue;
        }
        let item: ProviderItem = serde_json::from_value(item)?;
        regions.insert(
            item.name,
            RegionReport {
                cases: item.cases,
                cured: item.cured,
                deaths: item.deaths,
                coordinates: item.coordinates,
                histogram: item.histogram.unwrap_or_default(),
            },
        );
    }
    Ok(regions)
}

/// Poll the source once. When `dump_dir` is given the record is also saved as JSON.
pub fn fetch(
    source: &dyn PageSource,
    dump_dir: Option<&Path>,
) -> Result<PendingRecord, FetchError> {
    let page = source.fetch_page()?;
    let regions = parse_regions(extract_config(&page)?)?;
    let record = PendingRecord::new(Utc::now(), regions);

    if let Some(dir) = dump_dir {
        record.save_json(dir)?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><script type="application/json" class="config-view">{"covidData":{"items":[{"name":"Москва","ru":true,"cases":1613,"cured":67,"deaths":3,"coordinates":[37.617,55.755],"histogram":[{"ts":1585000000,"value":100}]},{"name":"Италия","ru":false,"cases":100000},{"name":"Тверская область","ru":true,"cases":5,"cured":0,"deaths":0,"coordinates":[35.9,56.86]}]}}</script></body></html>"#;

    #[test]
    fn extracts_marker_payload() {
        let config = extract_config(PAGE).unwrap();
        assert!(config.starts_with("{\"covidData\""));
        assert!(config.ends_with("}}"));
    }

    #[test]
    fn missing_marker_is_an_extraction_error() {
        let err = extract_config("<html><body>maintenance</body></html>").unwrap_err();
        assert!(matches!(err, FetchError::Extraction));
    }

    #[test]
    fn keeps_only_russian_items() {
        let regions = parse_regions(extract_config(PAGE).unwrap()).unwrap();
        assert_eq!(regions.len(), 2);

        let moscow = &regions["Москва"];
        assert_eq!((moscow.cases, moscow.cured, moscow.deaths), (1613, 67, 3));
        assert_eq!(moscow.lat_lon(), Some((55.755, 37.617)));
        assert_eq!(moscow.histogram.len(), 1);
        assert!(regions["Тверская область"].histogram.is_empty());
    }

    #[test]
    fn null_histogram_reads_as_empty() {
        let config = r#"{"covidData":{"items":[{"name":"Москва","ru":true,"cases":5,"cured":1,"deaths":0,"coordinates":null,"histogram":null}]}}"#;
        let regions = parse_regions(config).unwrap();
        assert!(regions["Москва"].histogram.is_empty());
        assert_eq!(regions["Москва"].lat_lon(), None);
    }

    #[test]
    fn fetch_from_fixture_without_dump() {
        let record = fetch(&FixtureSource::new(PAGE), None).unwrap();
        assert!(record.regions.contains_key("Москва"));
    }
}
