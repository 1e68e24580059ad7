//! Domain definitions.

pub mod geo;
pub mod land;
pub mod user;

pub use self::{
    geo::{Polygon, Vertex},
    land::Land,
    user::User,
};
