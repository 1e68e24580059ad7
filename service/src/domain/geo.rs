//! Geographic primitives of a [`Land`] outline.
//!
//! [`Land`]: crate::domain::Land

use derive_more::{Deref, Display, Error, Into};
use serde::{Deserialize, Serialize};

/// Single latitude/longitude point of a map.
///
/// Serialized as a `[lat, lng]` pair.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Vertex {
    /// Latitude in degrees, within `[-90, 90]`.
    lat: f64,

    /// Longitude in degrees, within `[-180, 180]`.
    lng: f64,
}

impl Vertex {
    /// Creates a new [`Vertex`] if both coordinates are finite and within
    /// their geographic range.
    ///
    /// # Errors
    ///
    /// If any of the coordinates is out of its range or isn't finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, VertexError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(VertexError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(VertexError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Returns the latitude of this [`Vertex`].
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Returns the longitude of this [`Vertex`].
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

impl TryFrom<(f64, f64)> for Vertex {
    type Error = VertexError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lng)
    }
}

impl From<Vertex> for (f64, f64) {
    fn from(v: Vertex) -> Self {
        (v.lat, v.lng)
    }
}

/// Error of constructing a [`Vertex`].
#[derive(Clone, Copy, Debug, Display, Error, PartialEq)]
pub enum VertexError {
    /// Latitude is out of `[-90, 90]` or isn't finite.
    #[display("latitude `{_0}` is out of range")]
    Latitude(#[error(not(source))] f64),

    /// Longitude is out of `[-180, 180]` or isn't finite.
    #[display("longitude `{_0}` is out of range")]
    Longitude(#[error(not(source))] f64),
}

/// Closed outline of a [`Land`], in authoring order.
///
/// [`Land`]: crate::domain::Land
#[derive(Clone, Debug, Deref, Deserialize, Into, PartialEq, Serialize)]
#[serde(try_from = "Vec<Vertex>", into = "Vec<Vertex>")]
pub struct Polygon(Vec<Vertex>);

impl Polygon {
    /// Minimal number of vertices forming a [`Polygon`].
    pub const MIN_VERTICES: usize = 3;

    /// Creates a new [`Polygon`] out of the provided `vertices`, preserving
    /// their order.
    ///
    /// # Errors
    ///
    /// If fewer than [`Polygon::MIN_VERTICES`] are provided.
    pub fn new(vertices: Vec<Vertex>) -> Result<Self, TooFewVertices> {
        if vertices.len() < Self::MIN_VERTICES {
            return Err(TooFewVertices(vertices.len()));
        }
        Ok(Self(vertices))
    }

    /// Returns the vertices of this [`Polygon`].
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.0
    }
}

impl TryFrom<Vec<Vertex>> for Polygon {
    type Error = TooFewVertices;

    fn try_from(vertices: Vec<Vertex>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

/// Error of constructing a [`Polygon`] out of too few vertices.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("polygon requires at least 3 vertices, got {_0}")]
pub struct TooFewVertices(#[error(not(source))] pub usize);

#[cfg(test)]
mod spec {
    use super::{Polygon, TooFewVertices, Vertex, VertexError};

    fn v(lat: f64, lng: f64) -> Vertex {
        Vertex::new(lat, lng).unwrap()
    }

    #[test]
    fn accepts_range_boundaries() {
        assert!(Vertex::new(90.0, 180.0).is_ok());
        assert!(Vertex::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_or_non_finite() {
        assert_eq!(Vertex::new(90.5, 0.0), Err(VertexError::Latitude(90.5)));
        assert_eq!(
            Vertex::new(0.0, -180.1),
            Err(VertexError::Longitude(-180.1)),
        );
        assert!(Vertex::new(f64::NAN, 0.0).is_err());
        assert!(Vertex::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn polygon_requires_three_vertices() {
        assert_eq!(
            Polygon::new(vec![v(1.0, 1.0), v(2.0, 2.0)]),
            Err(TooFewVertices(2)),
        );
        assert!(Polygon::new(vec![v(1.0, 1.0), v(2.0, 2.0), v(3.0, 3.0)])
            .is_ok());
    }

    #[test]
    fn polygon_keeps_authoring_order() {
        let vertices = vec![v(3.0, 3.0), v(1.0, 1.0), v(2.0, 2.0)];
        let polygon = Polygon::new(vertices.clone()).unwrap();
        assert_eq!(polygon.vertices(), vertices.as_slice());
    }

    #[test]
    fn serializes_as_nested_pairs() {
        let polygon = Polygon::new(vec![
            v(22.94, 89.18),
            v(22.95, 89.19),
            v(22.96, 89.2),
        ])
        .unwrap();
        let json = serde_json::to_string(&polygon).unwrap();
        assert_eq!(json, "[[22.94,89.18],[22.95,89.19],[22.96,89.2]]");
        assert_eq!(serde_json::from_str::<Polygon>(&json).unwrap(), polygon);
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<Polygon>("[[1,1],[2,2]]").is_err());
        assert!(
            serde_json::from_str::<Polygon>("[[1,1],[2,2],[91,3]]").is_err()
        );
    }
}
