//! Application provides REST API for interacting with the [`Service`].
//!
//! [`Service`]: service::Service

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

pub mod api;
pub mod args;
pub mod config;
pub mod error;

use std::{future::Future, path::Path};

use axum::{
    routing::{get, post},
    Extension, Router,
};
use service::{
    command::{create_land, CreateLand, CreateUser},
    domain::{land, Land, User},
    infra::{database, Memory, Postgres},
    query, Command as _,
};
use tower_http::services::ServeDir;
use tracerr::Traced;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tokio as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    error::{AsError, Error},
};

/// [`Service`] operations backing the API.
///
/// Implemented for every [`Service`] flavour the API is served from, as
/// handlers require [`Send`] futures.
///
/// [`Service`]: service::Service
pub trait Backend: Clone + Send + Sync + 'static {
    /// Lists all the persisted [`Land`]s in their storage order.
    fn lands(
        &self,
    ) -> impl Future<Output = Result<Vec<Land>, Traced<database::Error>>>
           + Send;

    /// Looks up a [`Land`] by its [`land::Id`].
    fn land(
        &self,
        id: land::Id,
    ) -> impl Future<Output = Result<Option<Land>, Traced<database::Error>>>
           + Send;

    /// Executes the provided [`CreateLand`] command.
    fn create_land(
        &self,
        cmd: CreateLand,
    ) -> impl Future<
        Output = Result<Land, Traced<create_land::ExecutionError>>,
    > + Send;

    /// Allocates a new anonymous [`User`].
    fn create_user(
        &self,
    ) -> impl Future<Output = Result<User, Traced<database::Error>>> + Send;
}

/// Implements [`Backend`] for [`service::Service`]s over the provided
/// databases.
macro_rules! impl_backend {
    ($($db:ty),* $(,)?) => {$(
        impl Backend for service::Service<$db> {
            fn lands(
                &self,
            ) -> impl Future<
                Output = Result<Vec<Land>, Traced<database::Error>>,
            > + Send {
                self.execute(query::lands::All::by(()))
            }

            fn land(
                &self,
                id: land::Id,
            ) -> impl Future<
                Output = Result<Option<Land>, Traced<database::Error>>,
            > + Send {
                self.execute(query::land::ById::by(id))
            }

            fn create_land(
                &self,
                cmd: CreateLand,
            ) -> impl Future<
                Output = Result<Land, Traced<create_land::ExecutionError>>,
            > + Send {
                self.execute(cmd)
            }

            fn create_user(
                &self,
            ) -> impl Future<
                Output = Result<User, Traced<database::Error>>,
            > + Send {
                self.execute(CreateUser)
            }
        }
    )*};
}

impl_backend!(Memory, Postgres);

/// Builds the API [`Router`] on top of the provided [`Backend`], serving
/// uploaded images from the `uploads` directory.
pub fn router<B: Backend>(backend: B, uploads: impl AsRef<Path>) -> Router {
    Router::new()
        .route(
            "/lands",
            get(api::land::list::<B>).post(api::land::create::<B>),
        )
        .route("/lands/:id", get(api::land::get::<B>))
        .route("/users/create", post(api::user::create::<B>))
        .nest_service("/uploads", ServeDir::new(uploads))
        .layer(Extension(backend))
}

#[cfg(test)]
mod spec {
    use axum::{body::Body, Router};
    use http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use service::{infra::Memory, Service};
    use tower::ServiceExt as _;

    use super::router;

    fn app() -> Router {
        router(Service::new(Memory::default()), "uploads")
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
            .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn plot(name: &str) -> String {
        json!({
            "name": name,
            "price": 1000,
            "type": "Residential",
            "coordinates": [[22.94, 89.18], [22.95, 89.19], [22.96, 89.2]],
        })
        .to_string()
    }

    #[tokio::test]
    async fn creates_land() {
        let app = app();

        let (status, land) =
            send(&app, "POST", "/lands", Some(&plot("Plot A"))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(land["id"].is_string());
        assert_eq!(land["name"], "Plot A");
        assert_eq!(land["type"], "Residential");
        assert_eq!(land["coordinates"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn rejects_malformed_body() {
        let app = app();

        let (status, err) =
            send(&app, "POST", "/lands", Some("{\"name\": ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "MALFORMED_BODY");
    }

    #[tokio::test]
    async fn rejects_invalid_land() {
        let app = app();
        let body = json!({
            "name": "Plot A",
            "type": "Residential",
            "coordinates": [[1, 1], [2, 2]],
        })
        .to_string();

        let (status, err) = send(&app, "POST", "/lands", Some(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "INVALID_LAND");
        let (_, lands) = send(&app, "GET", "/lands", None).await;
        assert_eq!(lands, json!([]));
    }

    #[tokio::test]
    async fn rejects_unknown_owner() {
        let app = app();
        let mut body: Value = serde_json::from_str(&plot("Plot A")).unwrap();
        body["ownerId"] = json!("00000000-0000-0000-0000-000000000001");

        let (status, err) =
            send(&app, "POST", "/lands", Some(&body.to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], "OWNER_NOT_EXISTS");
    }

    #[tokio::test]
    async fn attributes_land_to_created_user() {
        let app = app();

        let (status, created) = send(&app, "POST", "/users/create", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created["user_id"].is_string());

        let mut body: Value = serde_json::from_str(&plot("Plot A")).unwrap();
        body["userId"] = created["user_id"].clone();
        let (status, land) =
            send(&app, "POST", "/lands", Some(&body.to_string())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(land["ownerId"], created["user_id"]);
    }

    #[tokio::test]
    async fn lists_lands_in_creation_order() {
        let app = app();
        for name in ["Plot A", "Plot B", "Plot C"] {
            let (status, _) =
                send(&app, "POST", "/lands", Some(&plot(name))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, lands) = send(&app, "GET", "/lands", None).await;

        assert_eq!(status, StatusCode::OK);
        let names = lands
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["name"].as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Plot A", "Plot B", "Plot C"]);
    }

    #[tokio::test]
    async fn gets_land_by_id() {
        let app = app();
        let (_, created) =
            send(&app, "POST", "/lands", Some(&plot("Plot A"))).await;
        let id = created["id"].as_str().unwrap();

        let uri = format!("/lands/{id}");
        let (status, land) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(land, created);

        let (status, err) = send(
            &app,
            "GET",
            "/lands/00000000-0000-0000-0000-000000000001",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], "LAND_NOT_EXISTS");
    }
}
