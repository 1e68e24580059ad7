//! [`User`]-related REST API.
//!
//! [`User`]: service::domain::User

use axum::{Extension, Json};
use serde::Serialize;
use service::domain::user;

use crate::{AsError, Backend, Error};

/// Response of the [`create()`] endpoint.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Created {
    /// ID of the allocated [`User`].
    ///
    /// [`User`]: service::domain::User
    pub user_id: user::Id,
}

/// `POST /users/create`: allocates a new anonymous [`User`].
///
/// [`User`]: service::domain::User
#[tracing::instrument(skip_all, fields(http.handler = "createUser"))]
pub async fn create<B: Backend>(
    Extension(backend): Extension<B>,
) -> Result<(http::StatusCode, Json<Created>), Error> {
    let user = backend
        .create_user()
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(Created { user_id: user.id })))
}
