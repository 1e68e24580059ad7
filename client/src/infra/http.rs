//! HTTP adapters of the land catalog API and the ArcGIS geocode server.

use common::operations::{Allocate, By, Insert, Select};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use service::domain::{user, Land, Vertex};
use tracerr::Traced;
use tracing as log;

use crate::{
    config,
    geocode::{Candidate, Lookup},
    submission::NewLand,
    Backend, Config, Error,
};

/// Builds a new [`Client`] timing out requests after the configured timeout.
fn client(conf: &Config) -> Result<Client, Traced<Error>> {
    Client::builder()
        .timeout(conf.timeout)
        .build()
        .map_err(|e| tracerr::new!(Error::Transient(e.to_string())))
}

/// [`Backend`] talking to the land catalog API over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    /// Underlying HTTP [`Client`].
    client: Client,

    /// Base URL of the API, without a trailing slash.
    url: String,
}

impl HttpBackend {
    /// Creates a new [`HttpBackend`] out of the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the HTTP [`Client`] cannot be initialized.
    pub fn new(conf: &Config) -> Result<Self, Traced<Error>> {
        Ok(Self {
            client: client(conf).map_err(tracerr::wrap!())?,
            url: conf.api_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Returns the full URL of the provided API `path`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }
}

/// Body of an API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    /// Human-readable description of the error.
    message: String,
}

/// Classifies an unsuccessful API response into an [`Error`].
fn classify(status: StatusCode, body: String) -> Error {
    if matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY,
    ) {
        let message = serde_json::from_str::<ApiError>(&body)
            .map_or(body, |e| e.message);
        Error::Validation(message)
    } else {
        Error::Transient(format!("unexpected `{status}` response: {body}"))
    }
}

/// Reads a `T`ype out of the provided API response.
async fn read<T: DeserializeOwned>(
    res: Result<Response, reqwest::Error>,
) -> Result<T, Traced<Error>> {
    let res = res.map_err(|e| tracerr::new!(Error::Transient(e.to_string())))?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(tracerr::new!(classify(status, body)));
    }

    res.json()
        .await
        .map_err(|e| tracerr::new!(Error::Transient(e.to_string())))
}

impl Backend<Select<By<Vec<Land>, ()>>> for HttpBackend {
    type Ok = Vec<Land>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Land>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        read(self.client.get(self.endpoint("/lands")).send().await)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Backend<Insert<NewLand>> for HttpBackend {
    type Ok = Land;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(land): Insert<NewLand>,
    ) -> Result<Self::Ok, Self::Err> {
        read(
            self.client
                .post(self.endpoint("/lands"))
                .json(&land)
                .send()
                .await,
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl Backend<Allocate<user::Id>> for HttpBackend {
    type Ok = user::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Allocate<user::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of the allocation response.
        #[derive(Deserialize)]
        struct Allocated {
            /// Allocated ID.
            user_id: user::Id,
        }

        read::<Allocated>(
            self.client
                .post(self.endpoint("/users/create"))
                .send()
                .await,
        )
        .await
        .map(|a| a.user_id)
        .map_err(tracerr::wrap!())
    }
}

/// ArcGIS `findAddressCandidates` geocode provider.
#[derive(Clone, Debug)]
pub struct ArcGis {
    /// Underlying HTTP [`Client`].
    client: Client,

    /// Base URL of the geocode server, without a trailing slash.
    url: String,

    /// Country to restrict the search to.
    country_code: String,

    /// Maximal number of candidates to return.
    max_locations: u16,
}

impl ArcGis {
    /// Creates a new [`ArcGis`] provider out of the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the HTTP [`Client`] cannot be initialized.
    pub fn new(conf: &Config) -> Result<Self, Traced<Error>> {
        let config::Geocode {
            url,
            country_code,
            max_locations,
            min_query_len: _,
        } = &conf.geocode;
        Ok(Self {
            client: client(conf).map_err(tracerr::wrap!())?,
            url: url.trim_end_matches('/').to_owned(),
            country_code: country_code.clone(),
            max_locations: *max_locations,
        })
    }
}

/// Response of the `findAddressCandidates` endpoint.
#[derive(Debug, Deserialize)]
struct Found {
    /// Matching candidates, best first.
    #[serde(default)]
    candidates: Vec<FoundCandidate>,

    /// Error reported instead of candidates.
    error: Option<ApiError>,
}

/// Single candidate of a [`Found`] response.
#[derive(Debug, Deserialize)]
struct FoundCandidate {
    /// Matched address.
    address: String,

    /// Location of the matched address.
    location: FoundLocation,
}

/// Location of a [`FoundCandidate`].
#[derive(Debug, Deserialize)]
struct FoundLocation {
    /// Longitude.
    x: f64,

    /// Latitude.
    y: f64,
}

impl Found {
    /// Converts this [`Found`] response into [`Candidate`]s, preserving
    /// their order.
    ///
    /// Candidates located out of the geographic range are skipped.
    fn into_candidates(self) -> Result<Vec<Candidate>, Error> {
        if let Some(e) = self.error {
            return Err(Error::Transient(e.message));
        }
        Ok(self
            .candidates
            .into_iter()
            .filter_map(|c| {
                Vertex::new(c.location.y, c.location.x)
                    .map(|location| Candidate {
                        address: c.address.clone(),
                        location,
                    })
                    .inspect_err(|e| {
                        log::warn!("skipping candidate `{}`: {e}", c.address);
                    })
                    .ok()
            })
            .collect())
    }
}

impl Backend<Lookup> for ArcGis {
    type Ok = Vec<Candidate>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Lookup(query): Lookup,
    ) -> Result<Self::Ok, Self::Err> {
        let max_locations = self.max_locations.to_string();
        let found = read::<Found>(
            self.client
                .get(format!("{}/findAddressCandidates", self.url))
                .query(&[
                    ("address", query.as_str()),
                    ("maxLocations", max_locations.as_str()),
                    ("countryCode", self.country_code.as_str()),
                    ("f", "json"),
                ])
                .send()
                .await,
        )
        .await
        .map_err(tracerr::wrap!())?;

        found.into_candidates().map_err(|e| tracerr::new!(e))
    }
}

#[cfg(test)]
mod spec {
    use reqwest::StatusCode;

    use crate::Error;

    use super::{classify, Found};

    #[test]
    fn classifies_validation_failures() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            r#"{"code":"INVALID_LAND","message":"empty name"}"#.into(),
        );
        assert!(matches!(err, Error::Validation(m) if m == "empty name"));

        let err = classify(StatusCode::UNPROCESSABLE_ENTITY, "nope".into());
        assert!(matches!(err, Error::Validation(m) if m == "nope"));
    }

    #[test]
    fn classifies_other_failures_as_transient() {
        assert!(classify(StatusCode::INTERNAL_SERVER_ERROR, String::new())
            .is_transient());
        assert!(classify(StatusCode::NOT_FOUND, String::new()).is_transient());
    }

    #[test]
    fn reads_arcgis_candidates_in_order() {
        let found: Found = serde_json::from_str(
            r#"{
                "spatialReference": { "wkid": 4326 },
                "candidates": [
                    {
                        "address": "Khulna",
                        "location": { "x": 89.55, "y": 22.82 },
                        "score": 100
                    },
                    {
                        "address": "Nowhere",
                        "location": { "x": 200.0, "y": 0.0 },
                        "score": 90
                    },
                    {
                        "address": "Khulna Division",
                        "location": { "x": 89.2, "y": 22.9 },
                        "score": 80
                    }
                ]
            }"#,
        )
        .unwrap();

        let candidates = found.into_candidates().unwrap();

        assert_eq!(
            candidates
                .iter()
                .map(|c| (c.address.as_str(), c.location.lat()))
                .collect::<Vec<_>>(),
            [("Khulna", 22.82), ("Khulna Division", 22.9)],
        );
        assert_eq!(candidates[0].location.lng(), 89.55);
    }

    #[test]
    fn reports_arcgis_errors() {
        let found: Found = serde_json::from_str(
            r#"{ "error": { "code": 498, "message": "Invalid token" } }"#,
        )
        .unwrap();

        assert!(found.into_candidates().unwrap_err().is_transient());
    }
}
