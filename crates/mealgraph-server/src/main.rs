//! MealGraph — knowledge-graph recipe recommendation server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod export;
mod memory;
mod routes;
mod state;

use mealgraph_core::MealGraphConfig;
use mealgraph_infer::OracleManager;
use mealgraph_ingest::RecipeCatalog;
use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("MEALGRAPH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "build-graph" => {
                let data_dir = resolve_data_dir();
                let config = MealGraphConfig::from_env(&data_dir)?;
                let csv = args
                    .get(2)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| config.data_paths.recipes_csv.clone());
                let out_dir = args.get(3).map(PathBuf::from).unwrap_or(data_dir);
                let report = export::run_export(&csv, &out_dir);
                export::print_report(&report);
                std::process::exit(if report.succeeded() { 0 } else { 1 });
            }
            "--help" | "-h" | "help" => {
                println!("MealGraph — knowledge-graph recipe recommendation server");
                println!();
                println!("Usage: mealgraph [command]");
                println!();
                println!("Commands:");
                println!("  (none)                      Start the server");
                println!("  build-graph [csv] [out-dir] Export triples.csv and graph.json");
                println!("  help                        Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'mealgraph help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = MealGraphConfig::from_env(&data_dir)?;
    let port = config.port;
    let preload = config.preload;

    // A missing table leaves lookups empty; recommendations only need the oracle.
    let catalog = RecipeCatalog::load(&config.data_paths.recipes_csv).unwrap_or_else(|e| {
        warn!(
            "Recipe table unavailable ({}): {}",
            config.data_paths.recipes_csv.display(),
            e
        );
        RecipeCatalog::empty()
    });

    let oracle = OracleManager::from_paths(
        config.data_paths.triples_csv.clone(),
        config.data_paths.embeddings.clone(),
    );

    let state = Arc::new(AppState::new(config, catalog, oracle));

    // Warm the oracle in the background; requests arriving meanwhile wait on it.
    if preload {
        let manager = state.oracle.clone();
        tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            match manager.get() {
                Ok(handle) => info!(
                    "Oracle ready in {} ms ({}, {} entities), resident memory {} MiB",
                    started.elapsed().as_millis(),
                    handle.backend(),
                    handle.vocabulary().num_entities(),
                    memory::resident_mib()
                ),
                Err(e) => warn!("Oracle warm-up failed, will retry on demand: {}", e),
            }
        });
    }

    let app = routes::build_router(state.clone());
    info!("Startup complete, resident memory {} MiB", memory::resident_mib());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("MealGraph server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.oracle.release();
    Ok(())
}
