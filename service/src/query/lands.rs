//! [`Query`] collection related to the multiple [`Land`]s.

use common::operations::By;

use crate::domain::Land;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the persisted [`Land`]s in their storage order.
pub type All = DatabaseQuery<By<Vec<Land>, ()>>;
