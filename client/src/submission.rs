//! Candidate [`Land`] submitted on commit.
//!
//! [`Land`]: service::domain::Land

use rust_decimal::Decimal;
use serde::Serialize;
use service::domain::{land, user, Polygon};

/// User-entered descriptive fields of a new [`Land`].
///
/// Nothing is validated here: the backend is the one to refuse an empty name
/// or a negative price.
///
/// [`Land`]: service::domain::Land
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Display name.
    pub name: String,

    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Image to display instead of the placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Asking price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    /// Usage kind.
    #[serde(rename = "type")]
    pub kind: land::Kind,

    /// Market availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<land::Availability>,

    /// Ownership type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership_type: Option<land::Ownership>,

    /// [`User`] the new [`Land`] is attributed to.
    ///
    /// [`Land`]: service::domain::Land
    /// [`User`]: service::domain::User
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<user::Id>,
}

impl Metadata {
    /// Creates new [`Metadata`] with only the required fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: land::Kind) -> Self {
        Self {
            name: name.into(),
            description: None,
            image_url: None,
            price: None,
            kind,
            availability_status: None,
            ownership_type: None,
            owner_id: None,
        }
    }
}

/// [`Land`] without an ID, as sent to the backend for creation.
///
/// [`Land`]: service::domain::Land
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewLand {
    /// Descriptive fields.
    #[serde(flatten)]
    pub metadata: Metadata,

    /// Committed outline, in authoring order.
    pub coordinates: Polygon,
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;
    use service::domain::{land, Polygon, Vertex};

    use super::{Metadata, NewLand};

    #[test]
    fn serializes_as_request_body() {
        let land = NewLand {
            metadata: Metadata {
                price: Some(Decimal::from(1000)),
                availability_status: Some(land::Availability::ForSale),
                ..Metadata::new("Plot A", land::Kind::FishFarm)
            },
            coordinates: Polygon::new(vec![
                Vertex::new(22.94, 89.18).unwrap(),
                Vertex::new(22.95, 89.19).unwrap(),
                Vertex::new(22.96, 89.2).unwrap(),
            ])
            .unwrap(),
        };

        let json = serde_json::to_value(&land).unwrap();
        assert_eq!(json["name"], "Plot A");
        assert_eq!(json["type"], "Fish Farm");
        assert_eq!(json["availabilityStatus"], "For Sale");
        assert_eq!(json["price"], 1000.0);
        assert_eq!(json["coordinates"][0][0], 22.94);
        assert!(json.get("imageUrl").is_none());
        assert!(json.get("id").is_none());
    }
}
