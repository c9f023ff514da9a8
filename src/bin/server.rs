use std::{
    env,
    error::Error,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use finance_tracker::{
    AppState, PaginationConfig, RateLimitConfig, RateLimiter, build_router, close_db, cors_layer,
    graceful_shutdown, logging_middleware, rate_limit_middleware,
};

/// The longest a session may last without activity, one year.
const MAX_COOKIE_DURATION_MINUTES: i64 = 365 * 24 * 60;

/// The JSON REST API server for the finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The IP address to listen on.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: IpAddr,

    /// The number of transactions per page when a request does not give a limit.
    #[arg(long, default_value_t = 50)]
    page_size: u64,

    /// The largest page size a request may ask for.
    #[arg(long, default_value_t = 500)]
    max_page_size: u64,

    /// How long a session lasts without activity, in minutes.
    #[arg(
        long,
        default_value_t = 60,
        value_parser = clap::value_parser!(i64).range(1..=MAX_COOKIE_DURATION_MINUTES),
    )]
    cookie_duration_minutes: i64,

    /// The origin of the browser client allowed to call the API with credentials.
    #[arg(long, default_value = "http://localhost:3000")]
    cors_origin: String,

    /// The most requests one IP address may make per rate limit window.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    rate_limit: u32,

    /// The length of the rate limit window, in minutes, at most one day.
    #[arg(
        long,
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..=24 * 60),
    )]
    rate_limit_window_minutes: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    if args.page_size == 0 || args.page_size > args.max_page_size {
        return Err(format!(
            "--page-size must be between 1 and --max-page-size ({})",
            args.max_page_size
        )
        .into());
    }

    let addr = SocketAddr::new(args.address, args.port);
    let cors_origin = HeaderValue::from_str(&args.cors_origin)
        .map_err(|error| format!("--cors-origin is not a valid header value: {error}"))?;
    let max_requests = NonZeroU32::new(args.rate_limit).ok_or("--rate-limit must be at least 1")?;
    let rate_limiter = RateLimiter::new(RateLimitConfig {
        max_requests,
        window: std::time::Duration::from_secs(args.rate_limit_window_minutes * 60),
    });

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let conn = Connection::open(&args.db_path)?;
    let pagination_config = PaginationConfig {
        default_page_size: args.page_size,
        max_page_size: args.max_page_size,
    };
    let state = AppState::new(conn, &secret, pagination_config)?
        .with_cookie_duration(Duration::minutes(args.cookie_duration_minutes));
    let db_connection = state.db_connection.clone();

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .layer(cors_layer(cors_origin));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    tracing::info!("Server stopped, closing the database.");
    close_db(db_connection)?;

    Ok(())
}

fn setup_logging() {
    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

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
        // Errors are logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
