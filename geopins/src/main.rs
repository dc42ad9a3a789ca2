use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use geocoding_api::GeocodingClient;
use geopins::{
    backend::{Backend, FileStorage},
    config::BACKEND_CONFIG,
    environment, init_log,
    views::{parse_marker_path, HeadlessMap, History, MAP_ROUTE},
    App, MarkerStore,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List saved markers
    List,
    /// Look up an address without saving anything
    Search { query: String },
    /// Search for an address and save one of the results as a marker
    Add {
        query: String,
        /// Index of the search result to save
        #[arg(short, long, default_value_t = 0)]
        pick: usize,
    },
    /// Save a marker at a coordinate, the address is looked up
    Drop {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
    /// Remove a marker
    Remove { id: String },
    /// Open the map on a `/map/<marker id>` route
    Show { route: String },
}

macro_rules! print_err_and_exit {
    () => {
        |e| {
            log::error!("{e}");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    if cli.debug {
        std::env::set_var("RUST_LOG", "debug");
    }
    init_log();

    let env = environment::load().unwrap_or_else(print_err_and_exit!());

    log::info!("Using data directory {}", env.data_dir.display());
    let storage = Arc::new(FileStorage::new(&env.data_dir));
    let backend = Backend::new(storage, BACKEND_CONFIG.storage_key, env.backend_delay);
    let store = Arc::new(MarkerStore::new(backend));

    let geocoder = GeocodingClient::new(env.geocoding_base_url.as_str())
        .context("Cannot create geocoding client")?
        .with_api_key(env.geocoding_api_key.clone());
    let geocoder = Arc::new(geocoder);

    store.load_markers().await.context("Cannot load markers")?;

    let route_marker_id = match cli.command {
        Some(Command::Show { ref route }) => match parse_marker_path(route) {
            Some(id) => Some(id),
            None => {
                eprintln!("Not a marker route `{route}`, expected {MAP_ROUTE}/<marker id>");
                std::process::exit(1);
            }
        },
        _ => None,
    };
    let mut app = App::mount(
        store.clone(),
        geocoder,
        HeadlessMap::default(),
        History::default(),
        route_marker_id.clone(),
        env.locale,
    );
    log::debug!(
        "Map tiles from {} ({})",
        app.map.widget().tile_layer_url(),
        app.map.widget().tile_layer_attribution()
    );

    let mut failed = false;

    match cli.command {
        Some(Command::List) | None => print_markers(&app),
        Some(Command::Search { query }) => {
            app.list.set_query(query);
            app.list.perform_search().await;
            print_search(&app);
        }
        Some(Command::Add { query, pick }) => match app.add_from_search(&query, pick).await {
            Ok(marker) => println!("Added {}  {}  {}", marker.id, marker.coordinates(), marker.address),
            Err(e) => {
                eprintln!("{e}");
                failed = true;
            }
        },
        Some(Command::Drop { lat, lng }) => {
            app.map.set_adding_mode(true);
            match app.map.on_map_click(lat, lng).await {
                Some(marker) => {
                    println!("Added {}  {}  {}", marker.id, marker.coordinates(), marker.address)
                }
                None => {
                    eprintln!("{}", app.map.error_message().unwrap_or("No marker added"));
                    failed = true;
                }
            }
        }
        Some(Command::Remove { id }) => {
            app.list.remove_marker(&id).await;
            print_markers(&app);
        }
        Some(Command::Show { .. }) => match store.selected_marker() {
            Some(marker) => {
                println!("{}  {}  {}", marker.id, marker.coordinates(), marker.address);
                if let Some((lat, lng, zoom)) = app.map.widget().view() {
                    println!("View centered on {lat}, {lng} at zoom {zoom}");
                }
            }
            None => {
                eprintln!("Unknown marker `{}`", route_marker_id.unwrap_or_default());
                failed = true;
            }
        },
    }

    let error = store.error();
    app.unmount();

    if let Some(e) = error {
        eprintln!("{e}");
        failed = true;
    }
    if failed {
        std::process::exit(1);
    }

    Ok(())
}

fn print_markers(app: &App<HeadlessMap, History>) {
    let rows = app.list.rows();
    if rows.is_empty() {
        println!("No markers yet");
    }
    for row in rows {
        let selected = if row.selected { "*" } else { " " };
        println!("{selected} {}  {}  {}", row.id, row.coordinates, row.address);
    }
}

fn print_search(app: &App<HeadlessMap, History>) {
    let search = app.list.search();
    if let Some(ref e) = search.error {
        eprintln!("{e}");
        return;
    }
    for (i, result) in search.results.iter().enumerate() {
        println!(
            "[{i}] {}  {}",
            ui_common::format_coordinates(result.lat, result.lng),
            result.address
        );
    }
}
