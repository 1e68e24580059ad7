use std::{io, sync::OnceLock, time};

use application::{config, router, Args, Config};
use axum::{extract::MatchedPath, Router};
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{postgres, Memory, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(log_layer(false))
        .with(log_layer(true))
        .init();

    _ = start().await;
}

/// Writes spans and events either to `stderr` (warnings and errors) or to
/// `stdout` (everything else), up to the configured [`LOG_LEVEL`].
fn log_layer<S>(stderr: bool) -> impl Layer<S>
where
    S: log::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let fmt = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_thread_names(true);
    let fmt = if stderr {
        fmt.with_writer(io::stderr).boxed()
    } else {
        fmt.with_writer(io::stdout).boxed()
    };

    fmt.with_filter(filter_fn(move |meta| {
        let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
        meta.is_span()
            || (STDERR_LEVELS.contains(meta.level()) == stderr
                && max >= *meta.level())
    }))
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        server,
        storage,
        postgres,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level)
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let api = match storage {
        config::Storage::Memory => {
            log::warn!("serving from memory, `Land`s are lost on shutdown");
            router(Service::new(Memory::default()), &server.uploads_dir)
        }
        config::Storage::Postgres => {
            let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
                log::error!("failed to initialize `Postgres` client: {e}");
            })?;
            migrations::runner()
                .run_async(&mut postgres)
                .await
                .map_err(|e| {
                    log::error!("failed to run database migrations: {e}");
                })?;
            router(Service::new(postgres), &server.uploads_dir)
        }
    };

    let base_path = server.base_path.trim_end_matches('/');
    let app = if base_path.is_empty() {
        api
    } else {
        Router::new().nest(base_path, api)
    };

    let app = app.layer(cors(&server.cors.origins)?).layer(
        TraceLayer::new_for_http()
            .make_span_with(|r: &http::Request<_>| {
                log::info_span!(
                    "HTTP request",
                    http.client_ip = InsecureClientIp::from(
                        r.headers(),
                        r.extensions()
                    )
                        .map(|ip| ip.0.to_string())
                        .ok(),
                    http.method = r.method().as_str(),
                    http.route = r
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str),
                    http.target = r
                        .uri()
                        .path_and_query()
                        .map(http::uri::PathAndQuery::as_str),
                    http.status_code = log::field::Empty,
                )
            })
            .on_response(
                |r: &http::Response<_>,
                 dur: time::Duration,
                 span: &log::Span| {
                    _ = span.record("http.status_code", r.status().as_u16());

                    let duration = format!("{}ms", dur.as_millis());
                    if r.status().is_server_error() {
                        log::error!(%duration);
                    } else if r.status().is_client_error() {
                        log::warn!(%duration);
                    } else {
                        log::info!(%duration);
                    }
                },
            ),
    );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}{base_path}`", server.host, server.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Builds a [`CorsLayer`] allowing the provided `origins`, where `*` allows
/// any.
fn cors(origins: &[String]) -> Result<CorsLayer, ()> {
    let cors = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([http::header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return Ok(cors.allow_origin(AllowOrigin::any()));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin.parse::<http::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not correct CORS origin: {e}");
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cors.allow_origin(origins))
}
