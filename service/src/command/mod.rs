//! [`Command`] definition.

pub mod create_land;
pub mod create_user;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{create_land::CreateLand, create_user::CreateUser};
