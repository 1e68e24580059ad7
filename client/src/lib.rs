//! Client-side core of the land catalog: polygon authoring, the fetched
//! [`Catalog`], map [`Viewport`] synchronization and geocode search.
//!
//! A UI layer dispatches its events into a [`Session`] and renders the
//! snapshots it exposes.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod catalog;
pub mod config;
pub mod draft;
pub mod error;
pub mod geocode;
pub mod infra;
pub mod session;
pub mod submission;
pub mod viewport;

pub use self::{
    catalog::Catalog,
    config::Config,
    draft::{ClickTarget, Draft, Mode, Rejection},
    error::Error,
    geocode::{Candidate, SearchBox, SearchProxy},
    session::Session,
    submission::{Metadata, NewLand},
    viewport::{View, Viewport, Zoom},
};

/// Remote backend persisting [`Land`]s and allocating [`User`] IDs.
///
/// [`Land`]: service::domain::Land
/// [`User`]: service::domain::User
pub use common::Handler as Backend;
