//! [`Land`]-related REST API.

use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use common::UnknownKind;
use derive_more::{Display, Error as StdError};
use rust_decimal::Decimal;
use serde::Deserialize;
use service::{
    command::{create_land, CreateLand},
    domain::{
        geo::{TooFewVertices, VertexError},
        land, Land, Polygon, Vertex,
    },
};
use uuid::Uuid;

use crate::{define_error, AsError, Backend, Error};

/// `GET /lands`: lists all the persisted [`Land`]s in their storage order.
#[tracing::instrument(skip_all, fields(http.handler = "listLands"))]
pub async fn list<B: Backend>(
    Extension(backend): Extension<B>,
) -> Result<Json<Vec<Land>>, Error> {
    backend
        .lands()
        .await
        .map(Json)
        .map_err(AsError::into_error)
}

/// `GET /lands/:id`: returns a single [`Land`].
///
/// # Errors
///
/// Possible error codes:
/// - `LAND_NOT_EXISTS` - [`Land`] with the provided ID doesn't exist.
#[tracing::instrument(skip_all, fields(http.handler = "getLand"))]
pub async fn get<B: Backend>(
    Extension(backend): Extension<B>,
    Path(id): Path<land::Id>,
) -> Result<Json<Land>, Error> {
    define_error! {
        enum GetError {
            #[code = "LAND_NOT_EXISTS"]
            #[status = NOT_FOUND]
            #[message = "`Land` with the specified ID does not exist"]
            NotExists,
        }
    }

    backend
        .land(id)
        .await
        .map_err(AsError::into_error)?
        .map(Json)
        .ok_or_else(|| GetError::NotExists.into())
}

/// `POST /lands`: persists a [`NewLand`] and returns the created [`Land`].
///
/// # Errors
///
/// Possible error codes:
/// - `MALFORMED_BODY` - request body isn't a JSON [`NewLand`];
/// - `INVALID_LAND` - some [`NewLand`] field is invalid;
/// - `OWNER_NOT_EXISTS` - referenced owner `User` doesn't exist.
#[tracing::instrument(skip_all, fields(http.handler = "createLand"))]
pub async fn create<B: Backend>(
    Extension(backend): Extension<B>,
    body: Result<Json<NewLand>, JsonRejection>,
) -> Result<(http::StatusCode, Json<Land>), Error> {
    let Json(new) = body.map_err(AsError::into_error)?;
    let cmd = CreateLand::try_from(new).map_err(AsError::into_error)?;

    let land = backend
        .create_land(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(land)))
}

/// Body of a [`create()`] request: a [`Land`] without an ID.
///
/// Fields are taken raw, so every violation is reported as [`InvalidLand`].
/// Empty strings of optional fields are treated as absent values.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewLand {
    /// Display name.
    pub name: String,

    /// Free-form description.
    pub description: Option<String>,

    /// Image URL or server-absolute path.
    pub image_url: Option<String>,

    /// Asking price.
    pub price: Option<Decimal>,

    /// Label of the [`land::Kind`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Label of the [`land::Availability`].
    pub availability_status: Option<String>,

    /// Label of the [`land::Ownership`].
    pub ownership_type: Option<String>,

    /// Outline as `[lat, lng]` pairs, in authoring order.
    pub coordinates: Vec<Vec<f64>>,

    /// ID of the owner `User`.
    #[serde(alias = "userId")]
    pub owner_id: Option<Uuid>,
}

/// Error of converting a [`NewLand`] into a [`CreateLand`] command.
#[derive(Clone, Debug, Display, PartialEq, StdError)]
pub enum InvalidLand {
    /// Invalid [`land::Name`].
    #[display(
        "`name` must be non-empty, without surrounding whitespace and at most \
         512 bytes long"
    )]
    Name,

    /// Invalid [`land::Description`].
    #[display("`description` must be at most 4096 bytes long")]
    Description,

    /// Invalid [`land::ImageUrl`].
    #[display("`imageUrl` must be an HTTP(S) URL or an absolute path")]
    ImageUrl,

    /// Negative [`land::Price`].
    #[display("`price` cannot be negative")]
    Price,

    /// Unknown [`land::Kind`].
    #[display("`type`: {_0}")]
    Kind(UnknownKind),

    /// Unknown [`land::Availability`].
    #[display("`availabilityStatus`: {_0}")]
    Availability(UnknownKind),

    /// Unknown [`land::Ownership`].
    #[display("`ownershipType`: {_0}")]
    Ownership(UnknownKind),

    /// Coordinate isn't a pair.
    #[display("`coordinates[{_0}]` must be a `[lat, lng]` pair")]
    Pair(#[error(not(source))] usize),

    /// Coordinate is out of range.
    #[display("`coordinates[{index}]`: {source}")]
    Vertex {
        /// Index of the coordinate.
        index: usize,

        /// Range violation.
        source: VertexError,
    },

    /// Too few coordinates.
    #[display("`coordinates`: {_0}")]
    Polygon(TooFewVertices),
}

/// Drops the provided `value` if it's blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<NewLand> for CreateLand {
    type Error = InvalidLand;

    fn try_from(new: NewLand) -> Result<Self, Self::Error> {
        use InvalidLand as E;

        let NewLand {
            name,
            description,
            image_url,
            price,
            kind,
            availability_status,
            ownership_type,
            coordinates,
            owner_id,
        } = new;

        let vertices = coordinates
            .into_iter()
            .enumerate()
            .map(|(index, pair)| match pair[..] {
                [lat, lng] => Vertex::new(lat, lng)
                    .map_err(|source| E::Vertex { index, source }),
                _ => Err(E::Pair(index)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: land::Name::new(name).ok_or(E::Name)?,
            description: non_blank(description)
                .map(|d| land::Description::new(d).ok_or(E::Description))
                .transpose()?,
            image_url: non_blank(image_url)
                .map(|u| land::ImageUrl::new(u).ok_or(E::ImageUrl))
                .transpose()?,
            price: price
                .map(|p| land::Price::new(p).map_err(|_| E::Price))
                .transpose()?,
            kind: kind.parse().map_err(E::Kind)?,
            availability_status: non_blank(availability_status)
                .map(|s| s.parse().map_err(E::Availability))
                .transpose()?,
            ownership_type: non_blank(ownership_type)
                .map(|s| s.parse().map_err(E::Ownership))
                .transpose()?,
            coordinates: Polygon::new(vertices).map_err(E::Polygon)?,
            owner_id: owner_id.map(Into::into),
        })
    }
}

impl AsError for InvalidLand {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "INVALID_LAND",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "MALFORMED_BODY",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.body_text(),
            backtrace: None,
        })
    }
}

impl AsError for create_land::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "OWNER_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`User` with the specified `ownerId` does not \
                             exist"]
                OwnerNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::OwnerNotExists(_) => Some(Error::OwnerNotExists.into()),
        }
    }
}
