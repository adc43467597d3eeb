use clap::{Args as ClapArgs, Parser, Subcommand};
use sonixd_common::{ServerType, SortOrder};
use sonixd_core::api::HttpLibraryApi;
use sonixd_core::config::Config;
use sonixd_core::filter::{FilterPatch, ListStore};
use sonixd_core::normalize::NormalizedAlbum;
use sonixd_core::refresh::{AlbumListCache, GridHandle, ListRefreshCoordinator, RefreshOutcome};
use sonixd_core::server::ServerConfig;
use sonixd_core::sort::{self, AlbumListSort};
use sonixd_core::validate::{validate_server_credential, CredentialOutcome, ServerCredentials};
use std::sync::Arc;
use tracing::{error, info};

/// sonixd: check a music server and list its albums from the terminal.
#[derive(Parser)]
#[command(name = "sonixd")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in once and report the outcome.
    Validate(Connection),
    /// Log in and print the first page of the album list as JSON lines.
    Albums {
        #[command(flatten)]
        connection: Connection,

        /// Sort value, e.g. `name`, `recentlyAdded`, `year`.
        #[arg(long, env = "SONIXD_SORT_BY", value_parser = parse_sort)]
        sort_by: Option<AlbumListSort>,

        /// `asc` or `desc`. Defaults to the sort's own default order.
        #[arg(long, env = "SONIXD_SORT_ORDER", value_parser = parse_order)]
        sort_order: Option<SortOrder>,

        #[arg(long, env = "SONIXD_SEARCH")]
        search: Option<String>,

        #[arg(long, env = "SONIXD_GENRE")]
        genre: Option<String>,

        /// Page size override, at least 1.
        #[arg(long, env = "SONIXD_LIMIT", value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,
    },
}

#[derive(ClapArgs)]
struct Connection {
    /// Server URL, e.g. http://localhost:4533
    #[arg(long, env = "SONIXD_URL")]
    url: String,

    #[arg(long, env = "SONIXD_USERNAME")]
    username: String,

    #[arg(long, env = "SONIXD_PASSWORD", hide_env_values = true)]
    password: String,

    /// subsonic, navidrome or jellyfin
    #[arg(long, env = "SONIXD_SERVER_TYPE", value_parser = parse_server_type)]
    server_type: ServerType,

    /// Send the plain password instead of a salted token (Subsonic family).
    #[arg(long, env = "SONIXD_LEGACY_AUTH")]
    legacy_auth: bool,
}

fn parse_server_type(value: &str) -> Result<ServerType, String> {
    ServerType::parse(value).ok_or_else(|| format!("unknown server type: {value}"))
}

fn parse_sort(value: &str) -> Result<AlbumListSort, String> {
    AlbumListSort::parse(value).ok_or_else(|| format!("unknown sort: {value}"))
}

fn parse_order(value: &str) -> Result<SortOrder, String> {
    SortOrder::parse(value).ok_or_else(|| format!("unknown sort order: {value}"))
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Grid stand-in that prints whatever the coordinator pushes.
struct StdoutGrid;

impl GridHandle for StdoutGrid {
    fn scroll_to(&self, _offset: f64) {}

    fn reset_load_more_items_cache(&self) {}

    fn set_item_data(&self, items: Vec<NormalizedAlbum>) {
        for album in items {
            match serde_json::to_string(&album) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("Failed to encode album {}: {e}", album.id),
            }
        }
    }
}

#[tokio::main]
async fn main() {
    configure_logging();
    let cli = Cli::parse();
    let config = Config::load();
    let http = reqwest::Client::new();

    match cli.command {
        Command::Validate(connection) => {
            login(&http, &connection).await;
        }
        Command::Albums {
            connection,
            sort_by,
            sort_order,
            search,
            genre,
            limit,
        } => {
            let server = login(&http, &connection).await;
            let page_size = limit.unwrap_or(config.page_size);

            let store = ListStore::new();
            let page_key = "cli:albums";
            if let Some(sort_by) = sort_by {
                let order = sort::default_order(server.server_type, sort_by);
                store.merge(page_key, &FilterPatch::sort(sort_by, order));
            }
            if let Some(order) = sort_order {
                store.merge(page_key, &FilterPatch::sort_order(order));
            }
            if let Some(term) = search {
                store.merge(page_key, &FilterPatch::search_term(term));
            }
            if genre.is_some() {
                store.merge(page_key, &FilterPatch::genre(genre));
            }

            let coordinator = ListRefreshCoordinator::new(
                Arc::new(HttpLibraryApi::new(http.clone())),
                Arc::new(AlbumListCache::from_config(&config)),
                page_size,
            );
            let filter = store.get(page_key);
            info!(
                "Listing albums by {} ({})",
                sort::sort_by_label(Some(server.server_type), filter.sort_by),
                filter.sort_order.as_str()
            );

            match coordinator.refresh(&server, &filter, &StdoutGrid).await {
                RefreshOutcome::Applied { count } => info!("{count} albums"),
                RefreshOutcome::NoItems => info!("Server returned no album list"),
                RefreshOutcome::Stale => {}
                RefreshOutcome::Failed { message } => {
                    error!("Album list failed: {message}");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Validate the connection, exiting on anything but success.
async fn login(http: &reqwest::Client, connection: &Connection) -> ServerConfig {
    let credentials = ServerCredentials {
        url: connection.url.clone(),
        username: connection.username.clone(),
        password: connection.password.clone(),
        server_type: connection.server_type,
        legacy_auth: connection.legacy_auth,
    };

    match validate_server_credential(http, &credentials).await {
        CredentialOutcome::Authenticated { token, user_id } => {
            info!("Authenticated as {}", connection.username);
            ServerConfig::new(
                &connection.url,
                &connection.url,
                connection.server_type,
                &connection.username,
                token,
                user_id,
            )
        }
        CredentialOutcome::Rejected { message } => {
            error!("Login failed: {message}");
            std::process::exit(1);
        }
        CredentialOutcome::Unknown => {
            error!("Server returned an unrecognized login response");
            std::process::exit(1);
        }
    }
}
