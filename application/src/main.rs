use std::{
    future::IntoFuture as _,
    io,
    sync::{Arc, OnceLock},
    time,
};

use application::{api, graphql, Args, Config};
use axum::{
    extract::MatchedPath,
    routing::{on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::MakeWriter,
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt as _,
};

/// Levels logged to `stderr` rather than `stdout`.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Most verbose level to log, set once the [`Config`] is loaded.
static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    init_logging();

    _ = start().await;
}

/// Installs the global logger, splitting logs between `stdout` and `stderr`.
fn init_logging() {
    fn layer<S, W>(writer: W, to_stderr: bool) -> impl Layer<S>
    where
        S: tracing::Subscriber + for<'s> LookupSpan<'s>,
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(true)
            .with_thread_names(true)
            .with_writer(writer)
            .with_filter(filter_fn(move |meta| {
                let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
                meta.is_span()
                    || (STDERR_LEVELS.contains(meta.level()) == to_stderr
                        && max >= *meta.level())
            }))
    }

    tracing_subscriber::registry()
        .with(layer(io::stdout, false))
        .with(layer(io::stderr, true))
        .init();
}

/// Builds the [`CorsLayer`] allowing the configured origins to call the API.
fn cors(conf: &application::config::Cors) -> Result<CorsLayer, ()> {
    let allowed = conf.allowed_origin().map_err(|e| {
        log::error!("failed to set up CORS: {e}");
    })?;

    Ok(CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
        ])
        .allow_origin(allowed))
}

/// Creates a [`tracing::Span`] covering the whole served HTTP request.
fn request_span<B>(r: &http::Request<B>) -> tracing::Span {
    let client_ip = InsecureClientIp::from(r.headers(), r.extensions())
        .map(|ip| ip.0.to_string())
        .ok();
    let route = r.extensions().get::<MatchedPath>().map(MatchedPath::as_str);
    let user_agent = r
        .headers()
        .get(http::header::USER_AGENT)
        .and_then(|h| h.to_str().ok());

    tracing::info_span!(
        "HTTP request",
        http.client_ip = client_ip,
        http.method = r.method().as_str(),
        http.route = route,
        http.target = r
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = user_agent,
        http.status_code = tracing::field::Empty,
    )
}

/// Logs the served HTTP response inside its [`request_span()`].
fn log_response<B>(
    r: &http::Response<B>,
    took: time::Duration,
    span: &tracing::Span,
) {
    let status = r.status();
    _ = span.record("http.status_code", status.as_u16());

    let took = format!("{}ms", took.as_millis());
    if status.is_server_error() {
        log::error!(took = %took, "request failed");
    } else if status.is_client_error() {
        log::warn!(took = %took, "request rejected");
    } else {
        log::info!(took = %took, "request served");
    }
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    if LOG_LEVEL.set(log.level.into()).is_err() {
        log::warn!("log level is already set");
    }

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to set up `Postgres` pool: {e}");
    })?;

    migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to migrate database schema: {e}");
        })?;

    let service = Service::new(service.into(), postgres);

    let schema = api::Schema::new(
        api::Query,
        api::Mutation,
        juniper::EmptySubscription::new(),
    );

    let cors = cors(&server.cors)?;

    let app = Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| request_span(r))
                .on_response(
                    |r: &http::Response<_>,
                     took: time::Duration,
                     span: &tracing::Span| log_response(r, took, span),
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

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .into_future()
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}
