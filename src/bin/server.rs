use std::{env, fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{
    AppState, FormStrategy, PasswordStrategy, SessionConfig, build_router, get_local_offset,
    graceful_shutdown, logging_middleware,
};

/// The web server for fintrack.
///
/// The secret used to encrypt session cookies is read from the environment variable `SECRET`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the application from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone used to decide what "this month" is, e.g.
    /// "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// How long a session lasts without any requests, in minutes.
    #[arg(long, default_value_t = 5)]
    session_minutes: i64,

    /// Check passwords against the user table instead of accepting any non-empty credentials.
    #[arg(long)]
    verify_passwords: bool,

    /// Also write debug logs to this file.
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(args.log_file.as_deref());

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!("Invalid timezone {}", args.timezone);
        exit(1);
    }

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        exit(1);
    };

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let log_in_strategy = if args.verify_passwords {
        PasswordStrategy::NAME
    } else {
        tracing::warn!(
            "Using the \"{}\" log-in strategy which accepts any non-empty email and password. \
            Pass --verify-passwords to check passwords.",
            FormStrategy::NAME
        );
        FormStrategy::NAME
    };

    let session =
        SessionConfig::new(&secret).with_duration(Duration::minutes(args.session_minutes));

    let app_state = match AppState::new(conn, session, &args.timezone, log_in_strategy) {
        Ok(app_state) => app_state,
        Err(error) => {
            tracing::error!("Could not create the application state: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state))
        .layer(middleware::from_fn(logging_middleware));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging(log_file_path: Option<&str>) {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = log_file_path.and_then(|path| {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .inspect_err(|error| eprintln!("Could not open log file {path}: {error}"))
            .ok()?;

        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        )
    });

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
