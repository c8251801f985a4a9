//! Skiff Deployment Server - Entry Point
//!
//! A small self-hosting platform: POST a git repository URL and skiffd
//! clones, builds, and serves it, returning the transcript and URL.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use skiffd::app::options::{AppOptions, ServerOptions};
use skiffd::app::run::run;
use skiffd::logs::{init_logging, LogOptions};
use skiffd::storage::layout::StorageLayout;
use skiffd::storage::settings::Settings;
use skiffd::utils::version_info;
use skiffd::workers::reaper;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        println!("{}", serde_json::to_string_pretty(&version).unwrap());
        return;
    }

    // Resolve the storage layout, optionally overridden on the CLI
    let layout = match cli_args.get("data-dir") {
        Some(dir) => StorageLayout::new(dir),
        None => StorageLayout::default(),
    };

    // Retrieve the settings file; defaults apply when it is absent
    let settings_file = layout.settings_file();
    let settings = if settings_file.exists().await {
        match settings_file.read_json::<Settings>().await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Unable to read settings file: {}", e);
                return;
            }
        }
    } else {
        Settings::default()
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        json_format: settings.log_json,
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    // Run the server
    let options = AppOptions {
        storage: layout,
        server: ServerOptions {
            host: settings.host.clone(),
            port: settings.port,
        },
        deploy: settings.deploy.clone(),
        reaper: reaper::Options {
            interval: Duration::from_secs(settings.reaper.interval_secs),
            ttl: Duration::from_secs(settings.reaper.ttl_secs),
        },
        ..Default::default()
    };

    info!("Running skiffd {} on {}:{}", version.version, options.server.host, options.server.port);
    let result = run(options, await_shutdown_signal()).await;
    if let Err(e) = result {
        error!("Failed to run the server: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}
