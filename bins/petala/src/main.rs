//! petala - resolve Pétala runtime configuration and call the MagicSaaS API
//!
//! `resolve` prints what a page at a given URL would see; `request` sends
//! one call through the tenant-scoped client.

mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use magicsaas_api_client::{
    ApiError, ApiRequest, CredentialStore, ErrorKind, FileStore, MemoryStore, Method, UniversalApiClient,
};
use magicsaas_core::error::exit_codes;
use magicsaas_runtime_config::petala::PETALA_META_TAG;
use magicsaas_runtime_config::{ConfigResolver, HttpHost, ResolverOptions, RuntimeConfig};
use magicsaas_telemetry::TelemetryConfig;
use output::Status;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "petala")]
#[command(about = "Pétala runtime configuration and API client")]
#[command(version)]
struct Cli {
    /// Log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Print collected request metrics to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the runtime configuration for a page URL
    Resolve {
        #[command(flatten)]
        page: PageArgs,

        /// Print the configuration as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send one request through the tenant-scoped client
    Request(RequestArgs),
}

#[derive(clap::Args)]
struct RequestArgs {
    /// HTTP method
    #[arg(value_parser = parse_method)]
    method: Method,

    /// Path relative to the Pétala base path
    path: String,

    #[command(flatten)]
    page: PageArgs,

    /// JSON request body
    #[arg(long)]
    body: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Bearer token; saved to the credential file with --persist or --store-path
    #[arg(long)]
    token: Option<String>,

    /// Keep the session in the user's credential file between runs
    #[arg(long)]
    persist: bool,

    /// Credential file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    store_path: Option<PathBuf>,
}

#[derive(clap::Args)]
struct PageArgs {
    /// Page URL the configuration is resolved for
    #[arg(long, default_value = "http://localhost:3000/")]
    url: String,

    /// Value of the `magicsaas:petala` meta tag
    #[arg(long)]
    meta: Option<String>,

    /// Skip fetching the server override document
    #[arg(long)]
    no_fetch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let guard = magicsaas_telemetry::init_with_config(TelemetryConfig {
        log_level: cli.log_level.clone(),
        json: cli.log_json,
        ..TelemetryConfig::default()
    })?;

    let code = match cli.command {
        Commands::Resolve { page, json } => run_resolve(&page, json).await,
        Commands::Request(args) => run_request(args).await,
    };

    if cli.metrics {
        eprintln!("{}", magicsaas_telemetry::metrics().export_json());
    }

    drop(guard);
    std::process::exit(code);
}

fn parse_method(value: &str) -> Result<Method, String> {
    Method::from_bytes(value.to_ascii_uppercase().as_bytes()).map_err(|e| e.to_string())
}

fn parse_param(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{value}`"))
}

async fn resolve_config(page: &PageArgs) -> Result<Arc<RuntimeConfig>, i32> {
    let mut host = HttpHost::new(&page.url).map_err(|e| {
        Status::error(&format!("Invalid page URL: {e}"));
        exit_codes::CONFIG_ERROR
    })?;
    if let Some(meta) = &page.meta {
        host = host.with_meta(PETALA_META_TAG, meta);
    }

    let mut options = ResolverOptions::default();
    if page.no_fetch {
        options = options.without_override_fetch();
    }

    Ok(ConfigResolver::with_options(host, options).resolve().await)
}

async fn run_resolve(page: &PageArgs, json: bool) -> i32 {
    let config = match resolve_config(page).await {
        Ok(config) => config,
        Err(code) => return code,
    };

    if json {
        match serde_json::to_string_pretty(&*config) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                Status::error(&format!("Failed to serialize configuration: {e}"));
                return exit_codes::FAILURE;
            }
        }
    } else {
        output::print_config(&config);
    }

    if let Err(e) = config.validate() {
        Status::warning(&format!("Configuration does not validate: {e}"));
        return exit_codes::CONFIG_ERROR;
    }
    exit_codes::SUCCESS
}

fn is_absolute_url(path: &str) -> bool {
    path.contains("://")
}

fn credential_store(args: &RequestArgs) -> magicsaas_core::Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match &args.store_path {
        Some(path) => Arc::new(FileStore::new(path.clone())),
        None if args.persist => Arc::new(FileStore::default_location()?),
        None => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

async fn run_request(args: RequestArgs) -> i32 {
    if is_absolute_url(&args.path) {
        Status::error(&format!(
            "`{}` is an absolute URL; pass a path under the Pétala base path",
            args.path
        ));
        return exit_codes::VALIDATION_ERROR;
    }

    let config = match resolve_config(&args.page).await {
        Ok(config) => config,
        Err(code) => return code,
    };

    let store = match credential_store(&args) {
        Ok(store) => store,
        Err(e) => {
            Status::error(&format!("Credential store unavailable: {e}"));
            return exit_codes::CONFIG_ERROR;
        }
    };
    if let Some(token) = &args.token {
        if let Err(e) = store.set(&config.token_key(), token) {
            Status::error(&format!("Failed to store token: {e}"));
            return exit_codes::FAILURE;
        }
    }

    let client = match UniversalApiClient::builder(config).store(store).build() {
        Ok(client) => client,
        Err(e) => return report(&e),
    };

    let mut request = args
        .params
        .into_iter()
        .fold(ApiRequest::new(args.method, args.path), |req, (k, v)| req.with_param(k, v));
    if let Some(raw) = args.body.as_deref() {
        let parsed: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                Status::error(&format!("--body is not valid JSON: {e}"));
                return exit_codes::VALIDATION_ERROR;
            }
        };
        request = match request.with_body(&parsed) {
            Ok(request) => request,
            Err(e) => return report(&e),
        };
    }

    let start = Instant::now();
    match client.request::<serde_json::Value>(request).await {
        Ok(value) => {
            match serde_json::to_string_pretty(&value) {
                Ok(text) => println!("{text}"),
                Err(_) => println!("{value}"),
            }
            Status::success(&format!("Done in {}", output::format_duration(start.elapsed())));
            exit_codes::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn report(error: &ApiError) -> i32 {
    Status::error(&format!("{} error: {error}", error.kind()));
    if let Some(body) = error.body().filter(|b| !b.is_null()) {
        eprintln!("{body}");
    }

    match error.kind() {
        ErrorKind::Network => exit_codes::NETWORK_ERROR,
        ErrorKind::Auth => exit_codes::AUTH_ERROR,
        ErrorKind::Client => exit_codes::CONFIG_ERROR,
        ErrorKind::Http | ErrorKind::Decode => exit_codes::FAILURE,
    }
}
