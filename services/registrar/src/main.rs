//! OGC layer registrar service.
//!
//! Reconciles a SQLite layer registry against the capability documents of
//! configured WMS/WFS/WMTS endpoints:
//! - Endpoint discovery across common vendor paths
//! - Auto-detection of the protocols each URL answers
//! - Create/merge/skip/delete reconciliation per layer
//! - JSON registration report on stdout

mod config;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ogc_capabilities::CapabilityExtractor;
use ogc_common::Protocol;
use ogc_discovery::{HttpFetch, ReqwestFetcher};
use ogc_registry::{
    LayerQuery, LayerRepository, RegistrationEngine, RegistrationReport, RegistrationRequest,
};

use config::RegistrarConfig;
use store::SqliteLayerRepository;

#[derive(Parser, Debug)]
#[command(name = "registrar")]
#[command(about = "OGC service discovery and layer registry reconciliation")]
struct Args {
    /// Service URLs to register (in addition to the config file)
    #[arg(short, long)]
    url: Vec<String>,

    /// Service name for URLs given with --url
    #[arg(long)]
    name: Option<String>,

    /// Force a protocol for URLs given with --url (WMS, WFS or WMTS)
    #[arg(long)]
    service_type: Option<String>,

    /// Services configuration file
    #[arg(long, env = "CONFIG_FILE", default_value = "config/services.yaml")]
    config: PathBuf,

    /// Registry database path
    #[arg(long, env = "REGISTRY_DB", default_value = "/data/registrar/layers.db")]
    db: PathBuf,

    /// List registered layers instead of registering
    #[arg(long)]
    list: bool,

    /// Print registry statistics after the run
    #[arg(long)]
    stats: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting OGC layer registrar");

    let repository: Arc<dyn LayerRepository> =
        Arc::new(SqliteLayerRepository::open(&args.db).await?);

    let http: Arc<dyn HttpFetch> = Arc::new(ReqwestFetcher::with_default_timeout()?);
    let engine = RegistrationEngine::new(repository, CapabilityExtractor::new(http));

    if args.list {
        let page = engine.list_layers(LayerQuery::default()).await?;
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let requests = build_requests(&args)?;
    if requests.is_empty() {
        anyhow::bail!(
            "nothing to register: no --url given and {} lists no services",
            args.config.display()
        );
    }

    let mut combined = RegistrationReport::default();
    for request in &requests {
        let report = engine.register(request).await;
        merge_report(&mut combined, report);
    }

    println!("{}", serde_json::to_string_pretty(&combined)?);

    if args.stats {
        let stats = engine.statistics().await?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    info!(
        services = combined.summary.total_services,
        created = combined.summary.successful_layers,
        merged = combined.summary.merged_layers,
        deleted = combined.summary.deleted_layers,
        failed = combined.summary.failed_layers,
        "registration run complete"
    );

    Ok(())
}

/// One request per configured service entry (each may carry its own name
/// and forced protocol), plus one for the ad-hoc --url list.
fn build_requests(args: &Args) -> Result<Vec<RegistrationRequest>> {
    let mut requests = Vec::new();

    if args.config.exists() {
        let config = RegistrarConfig::load(&args.config)?;
        for entry in &config.services {
            requests.push(RegistrationRequest {
                service_urls: vec![entry.url.clone()],
                service_name: entry.name.clone(),
                service_type: entry.protocol()?,
            });
        }
    }

    if !args.url.is_empty() {
        let service_type = args
            .service_type
            .as_deref()
            .map(str::parse::<Protocol>)
            .transpose()?;
        requests.push(RegistrationRequest {
            service_urls: args.url.clone(),
            service_name: args.name.clone(),
            service_type,
        });
    }

    Ok(requests)
}

fn merge_report(combined: &mut RegistrationReport, report: RegistrationReport) {
    combined.summary.total_services += report.summary.total_services;
    combined.summary.successful_services += report.summary.successful_services;
    combined.summary.failed_services += report.summary.failed_services;
    combined.summary.total_layers += report.summary.total_layers;
    combined.summary.successful_layers += report.summary.successful_layers;
    combined.summary.failed_layers += report.summary.failed_layers;
    combined.summary.skipped_layers += report.summary.skipped_layers;
    combined.summary.deleted_layers += report.summary.deleted_layers;
    combined.summary.merged_layers += report.summary.merged_layers;
    combined.services.extend(report.services);
    combined.errors.extend(report.errors);
}
