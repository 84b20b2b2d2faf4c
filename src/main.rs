use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alpha_hunter::api::{create_rest_router, AppState};
use alpha_hunter::config::{Config, SourceMode};
use alpha_hunter::services::{report, score_and_rank, DashboardSummary, ObservationCollector};
use alpha_hunter::sources::{self, catalog::DatasetCatalog};

#[derive(Parser, Debug)]
#[command(name = "alpha-hunter", version, about = "ETH/Base alpha opportunity dashboard")]
struct Cli {
    /// Path to the TOML config
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Use the built-in demo tables instead of live APIs
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard API (default)
    Serve,
    /// Run a hunt and print the ranked opportunities
    Hunt {
        /// Repeat every N seconds
        #[arg(short, long)]
        watch: Option<u64>,
    },
    /// List ETH / Base datasets from the AMP playground
    Datasets,
}

#[tokio::main(worker_threads = 4)]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,alpha_hunter=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    tracing::info!("✓ Configuration loaded");

    let demo = cli.demo || config.sources.mode == SourceMode::Fixture;
    let sources = sources::build_sources(&config.sources, cli.demo);
    let collector = Arc::new(ObservationCollector::new(
        sources,
        Duration::from_secs(config.sources.collect_timeout_secs),
    ));
    tracing::info!("✓ Sources: {}", collector.source_names().join(", "));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, collector).await,
        Command::Hunt { watch } => hunt(&config, &collector, demo, watch).await,
        Command::Datasets => datasets(&config).await,
    }
}

async fn serve(config: Config, collector: Arc<ObservationCollector>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(AppState {
        collector,
        thresholds: config.thresholds,
        report: config.report,
        refresh_secs: config.server.refresh_secs,
    });

    let app = create_rest_router(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    println!("\n✓ Server ready on http://{}\n", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn hunt(
    config: &Config,
    collector: &ObservationCollector,
    demo: bool,
    watch: Option<u64>,
) -> Result<()> {
    println!("🎯 STARTING ETH-BASE ALPHA HUNTER...");

    if demo {
        println!("📦 Using fixture data");
    } else {
        let catalog = DatasetCatalog::new(
            &config.sources.catalog_url,
            Duration::from_secs(config.sources.timeout_secs),
        );
        match catalog.by_chain().await {
            Ok(by_chain) => print!("{}", report::render_datasets(&by_chain)),
            Err(e) => tracing::warn!("Dataset catalog unavailable: {}", e),
        }
    }

    loop {
        let start = Instant::now();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Polling {}", collector.source_names().join(", ")));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let collection = collector.collect_all().await;
        spinner.finish_and_clear();

        if !collection.failed.is_empty() {
            println!("⚠️  Unavailable: {}", collection.failed.join(", "));
        }

        let ranked = score_and_rank(&collection.observations, &config.thresholds);
        let summary = DashboardSummary::from_opportunities(&ranked, config.report.position_usd);
        print!("{}", report::render_dashboard(&ranked, &summary, config.report.top_n));

        let elapsed = start.elapsed();
        println!(
            "\n⏱️  {} [{} observations, {} opportunities] ({:.2}s)",
            chrono::Local::now().format("%H:%M:%S"),
            collection.observations.len(),
            ranked.len(),
            elapsed.as_secs_f64()
        );

        let Some(interval_secs) = watch else {
            return Ok(());
        };

        let sleep_time = Duration::from_secs(interval_secs).saturating_sub(elapsed);
        if sleep_time > Duration::ZERO {
            tokio::time::sleep(sleep_time).await;
        }
    }
}

async fn datasets(config: &Config) -> Result<()> {
    println!("🔍 Loading ETH Mainnet + Base Mainnet datasets...");

    let catalog = DatasetCatalog::new(
        &config.sources.catalog_url,
        Duration::from_secs(config.sources.timeout_secs),
    );
    let by_chain = catalog.by_chain().await.context("Failed to list datasets")?;

    print!("{}", report::render_datasets(&by_chain));
    for dataset in by_chain.ethereum.iter().chain(by_chain.base.iter()) {
        println!(
            "   {}/{} [{}]",
            dataset.namespace,
            dataset.name,
            dataset.indexing_chains.join(", ")
        );
    }
    Ok(())
}
