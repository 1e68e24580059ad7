//! [`Land`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{geo::Polygon, user};

/// Image shown for a [`Land`] without its own [`ImageUrl`].
pub const PLACEHOLDER_IMAGE: &str = "/images/place_holder.png";

/// Geotagged land parcel outlined on a map.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Land {
    /// ID of this [`Land`].
    pub id: Id,

    /// [`Name`] of this [`Land`].
    pub name: Name,

    /// [`Description`] of this [`Land`], if any.
    #[serde(default)]
    pub description: Option<Description>,

    /// [`ImageUrl`] of this [`Land`], if any.
    #[serde(default)]
    pub image_url: Option<ImageUrl>,

    /// [`Price`] of this [`Land`], if any.
    #[serde(default)]
    pub price: Option<Price>,

    /// [`Kind`] of this [`Land`].
    #[serde(rename = "type")]
    pub kind: Kind,

    /// [`Availability`] status of this [`Land`], if known.
    #[serde(default)]
    pub availability_status: Option<Availability>,

    /// [`Ownership`] type of this [`Land`], if known.
    #[serde(default)]
    pub ownership_type: Option<Ownership>,

    /// Outline of this [`Land`].
    pub coordinates: Polygon,

    /// [`User`] this [`Land`] is attributed to, if any.
    ///
    /// [`User`]: crate::domain::User
    #[serde(default, alias = "userId")]
    pub owner_id: Option<user::Id>,

    /// [`DateTime`] when this [`Land`] was created.
    pub created_at: CreationDateTime,
}

impl Land {
    /// Returns the image to display for this [`Land`], falling back to the
    /// [`PLACEHOLDER_IMAGE`].
    #[must_use]
    pub fn display_image(&self) -> &str {
        self.image_url
            .as_ref()
            .map_or(PLACEHOLDER_IMAGE, AsRef::as_ref)
    }
}

/// ID of a [`Land`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Land`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl TryFrom<String> for Name {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

/// Free-form description of a [`Land`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.len() <= 4096).then_some(Self(text))
    }
}

impl TryFrom<String> for Description {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

impl From<Description> for String {
    fn from(text: Description) -> Self {
        text.0
    }
}

/// URL (or server-absolute path) of a [`Land`] image.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`ImageUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^(https?://|/)\S+$").expect("valid regex")
        });

        let url = url.as_ref();
        url.len() <= 2048 && REGEX.is_match(url)
    }
}

impl TryFrom<String> for ImageUrl {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

impl From<ImageUrl> for String {
    fn from(url: ImageUrl) -> Self {
        url.0
    }
}

/// Non-negative asking price of a [`Land`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] out of the provided `amount`.
    ///
    /// # Errors
    ///
    /// If the `amount` is negative.
    pub fn new(amount: Decimal) -> Result<Self, NegativePrice> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(NegativePrice);
        }
        Ok(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = NegativePrice;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

/// Error of creating a negative [`Price`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("price cannot be negative")]
pub struct NegativePrice;

define_kind! {
    #[doc = "Kind of a [`Land`] usage."]
    enum Kind {
        #[doc = "Land for housing."]
        Residential = 1 as "Residential",

        #[doc = "Land for business."]
        Commercial = 2 as "Commercial",

        #[doc = "Agricultural land."]
        Farming = 3 as "Farming",

        #[doc = "Land with fish ponds."]
        FishFarm = 4 as "Fish Farm",
    }
}

define_kind! {
    #[doc = "Availability status of a [`Land`] on the market."]
    enum Availability {
        #[doc = "Offered for sale."]
        ForSale = 1 as "For Sale",

        #[doc = "Offered for rent."]
        ForRent = 2 as "For Rent",

        #[doc = "Already sold."]
        Sold = 3 as "Sold",

        #[doc = "Already leased."]
        Leased = 4 as "Leased",

        #[doc = "Offered at an auction."]
        Auction = 5 as "Auction",
    }
}

define_kind! {
    #[doc = "Ownership type of a [`Land`]."]
    enum Ownership {
        #[doc = "Privately owned."]
        Private = 1 as "Private",

        #[doc = "Owned by a government."]
        Government = 2 as "Government",

        #[doc = "Owned in common."]
        Common = 3 as "Common",
    }
}

/// [`DateTime`] when a [`Land`] was created.
pub type CreationDateTime = DateTimeOf<(Land, unit::Creation)>;
