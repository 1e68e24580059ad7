//! [`Config`]-related definitions.

use std::time;

use serde::Deserialize;
use smart_default::SmartDefault;

use crate::{geocode::SearchProxy, viewport};

/// Client configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// Base URL of the land catalog API.
    #[default("http://localhost:8080/api".to_owned())]
    pub api_url: String,

    /// Timeout of a single HTTP request.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,

    /// Key of the state blob in the local storage.
    #[default(viewport::DEFAULT_STORAGE_KEY.to_owned())]
    pub storage_key: String,

    /// Geocode search configuration.
    pub geocode: Geocode,
}

/// Geocode search configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Geocode {
    /// Base URL of the ArcGIS geocode server.
    #[default(
        "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer"
            .to_owned()
    )]
    pub url: String,

    /// Country to restrict the search to.
    #[default("BD".to_owned())]
    pub country_code: String,

    /// Maximal number of candidates to return.
    #[default(10)]
    pub max_locations: u16,

    /// Minimal number of characters in a query worth a lookup.
    #[default(SearchProxy::<()>::DEFAULT_MIN_QUERY_LEN)]
    pub min_query_len: usize,
}
