//! neighborgrid entry point: CLI wiring, config loading and server startup.

use std::path::Path;
use std::process;

use chrono::Local;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info};

use neighborgrid::cli::{parse_args, print_usage};
use neighborgrid::config::ServiceConfig;
use neighborgrid::engine::{derive_grid_health, generate_forecasts};
use neighborgrid::logging;

/// Loads config: `--config` takes priority, then `--preset`, then the default preset.
fn load_config(config_path: Option<&Path>, preset: Option<&str>) -> ServiceConfig {
    let loaded = match (config_path, preset) {
        (Some(path), _) => ServiceConfig::from_toml_file(path),
        (None, Some(name)) => ServiceConfig::from_preset(name),
        (None, None) => Ok(ServiceConfig::default()),
    };
    loaded.unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    })
}

/// Prints one forecast bundle and its grid health view as JSON.
fn print_once(rng: &mut StdRng) {
    let now = Local::now().naive_local();
    let bundle = generate_forecasts(now, rng);
    let health = derive_grid_health(&bundle, now, rng);
    let out = serde_json::json!({
        "forecast": bundle,
        "gridHealth": health,
    });
    match serde_json::to_string_pretty(&out) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            error!("failed to serialize output: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        print_usage();
        return;
    }

    logging::init();

    let mut config = load_config(cli.config.as_deref(), cli.preset.as_deref());

    // Precedence: file or preset, then environment, then CLI flags
    if let Err(e) = config.apply_env_overrides(|key| std::env::var(key).ok()) {
        error!("{e}");
        process::exit(1);
    }
    if let Some(seed) = cli.seed {
        config.engine.seed = Some(seed);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }

    let mut rng = match config.engine.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    if cli.once {
        print_once(&mut rng);
        return;
    }

    #[cfg(feature = "api")]
    {
        use std::sync::Arc;

        use neighborgrid::api::{AppState, serve};
        use neighborgrid::history::InMemoryHistory;
        use neighborgrid::io::export::export_csv;

        let (addr, trades) = match (config.socket_addr(), config.trade_book()) {
            (Ok(addr), Ok(trades)) => (addr, trades),
            (Err(e), _) | (_, Err(e)) => {
                error!("{e}");
                process::exit(1);
            }
        };
        info!(
            seeded = config.engine.seed.is_some(),
            trades = trades.len(),
            history_capacity = config.history.capacity,
            "starting neighborgrid"
        );

        let state = Arc::new(AppState::new(
            rng,
            InMemoryHistory::new(config.history.capacity),
            trades,
        ));

        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            error!("failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(serve(Arc::clone(&state), addr)) {
            error!("{e}");
            process::exit(1);
        }

        if let Some(path) = config.history.export_path.as_deref() {
            let history = state.history();
            if history.is_empty() {
                info!(path, "no summaries recorded; skipping export");
                return;
            }
            match export_csv(&history, Path::new(path)) {
                Ok(()) => info!(path, "history exported"),
                Err(e) => {
                    error!(path, "failed to export history: {e}");
                    process::exit(1);
                }
            }
        }
    }

    #[cfg(not(feature = "api"))]
    {
        error!("built without the `api` feature; only --once is available");
        process::exit(1);
    }
}
