// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{Level, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use inkwave::api::ErrorDetailMiddlewareFactory;
use inkwave::app_state::AppState;
use inkwave::bootstrap::{self, BootstrapResult};
use inkwave::config::ValidatedConfig;
use inkwave::headers::Headers;
use inkwave::iam::JwtAuthMiddlewareFactory;
use inkwave::login::GoogleIdentityProvider;
use inkwave::runtime_paths::RuntimePaths;
use inkwave::store::FileBlogStore;
use inkwave::util;

const HELP_TEXT: &str = "\
Usage: inkwave [-C <root>]

Starts the InkWave API server.

Options:
  -C <root>    Runtime directory holding config.yaml and data/ (default: .)
  -h, --help   Show this help
";

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if matches!(parsed_args.mode, RunMode::Help) {
        print!("{}", HELP_TEXT);
        return 0;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    if bootstrap.created_config {
        eprintln!(
            "[bootstrap] created config.yaml; set auth.google.client_id and client_secret before signing in"
        );
    }

    match System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

fn init_logging(config: &ValidatedConfig) -> std::io::Result<()> {
    let logger = env_logger::Builder::from_default_env()
        .filter_level(util::level_filter_from_config(&config.logging.level))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .build();

    util::init_logger(
        vec![
            ("actix_server".to_string(), Level::Info, Level::Debug),
            ("reqwest".to_string(), Level::Debug, Level::Trace),
        ],
        logger,
    )
    .map_err(|error| {
        eprintln!("❌ Failed to initialize logger: {}", error);
        std::io::Error::other(error.to_string())
    })
}

async fn run_server(bootstrap: BootstrapResult) -> std::io::Result<()> {
    let validated_config = Arc::new(bootstrap.validated_config);
    let runtime_paths = bootstrap.runtime_paths;

    init_logging(&validated_config)?;
    log_startup_info(&validated_config, &runtime_paths);

    let identity_provider = match GoogleIdentityProvider::new(validated_config.google.clone()) {
        Ok(provider) => Arc::new(provider),
        Err(error) => {
            eprintln!("❌ Failed to initialize Google sign-in: {}", error);
            return Err(std::io::Error::other(error.to_string()));
        }
    };

    let store = match FileBlogStore::new(runtime_paths.store_file.clone()) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            eprintln!(
                "❌ Failed to open blog store {}: {}",
                runtime_paths.store_file.display(),
                error
            );
            return Err(std::io::Error::other(error.to_string()));
        }
    };
    let app_state = match AppState::new(validated_config.clone(), store, identity_provider) {
        Ok(state) => web::Data::new(state),
        Err(error) => {
            eprintln!("❌ Failed to initialize application state: {}", error);
            eprintln!("❌ Application cannot start without the blog store.");
            return Err(std::io::Error::other(error.to_string()));
        }
    };
    info!("✅ Blog store loaded from {}", runtime_paths.store_file.display());

    let workers = validated_config.server.workers;
    let bind_address = (
        validated_config.server.host.clone(),
        validated_config.server.port,
    );
    let config_for_headers = validated_config.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(ErrorDetailMiddlewareFactory)
            .wrap(JwtAuthMiddlewareFactory)
            .wrap(Headers::new(config_for_headers.clone()))
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
            ))
            .configure(inkwave::routes)
    })
    .workers(workers)
    .bind(bind_address)?
    .run()
    .await
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {} - {}", config.app.name, config.app.description);
    info!(
        "Listening on {}:{} with {} worker(s)",
        config.server.host, config.server.port, config.server.workers
    );
    info!("Environment: {:?}", config.app.environment);
    info!("Client origin: {}", config.client.origin());
    if !config.is_development() && config.is_localhost_client() {
        log::warn!("Production mode with a localhost client; secure cookies will not reach it over http");
    }
    info!("Config file: {}", runtime_paths.config_file.display());
    info!("Data directory (canonical): {}", runtime_paths.data_dir.display());
    info!("Runtime root: {}", runtime_paths.root.display());

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

enum RunMode {
    Serve,
    Help,
}

struct ParsedArgs {
    runtime_root: PathBuf,
    mode: RunMode,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args
        .iter()
        .any(|arg| is_help_flag(arg) || arg.eq_ignore_ascii_case("help"))
    {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            mode: RunMode::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            return Err(format!("Unexpected argument: {}", arg));
        }
    }

    Ok(ParsedArgs {
        runtime_root: make_runtime_root_absolute(runtime_root)?,
        mode: RunMode::Serve,
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
