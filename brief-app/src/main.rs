use anyhow::{Context, Result};
use brief_app::{AppState, BriefService, router};
use brief_common::observability::init_logging;
use brief_config::{BriefConfig, BriefConfigLoader};
use brief_llm::ensure_summarizer_ready;
use brief_web::HeadlineSource;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Concurrent article downloads for `headlines --summarize`.
const SUMMARY_CONCURRENCY: usize = 3;

/// How often `serve` drops expired cache entries.
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "brief", version, about = "Summarize news articles with a pre-trained model")]
struct Cli {
    /// YAML config file; missing files are ignored.
    #[arg(long, global = true, env = "BRIEF_CONFIG", default_value = "brief.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web UI and JSON API.
    Serve {
        /// Overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Summarize one article and print the result.
    Summarize {
        url: String,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print current headlines.
    Headlines {
        #[arg(long, default_value = "hacker-news")]
        source: HeadlineSource,
        #[arg(long)]
        count: Option<usize>,
        /// Also summarize every listed article.
        #[arg(long)]
        summarize: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over file)
    let cfg: BriefConfig = BriefConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let log_path = init_logging(cfg.logging.to_log_config())?;
    tracing::debug!(log = %log_path.display(), "logging.ready");

    // 2) Summarizer ("model loading")
    let summarizer = ensure_summarizer_ready(&cfg.summarizer).await?;
    let service = Arc::new(BriefService::new(&cfg, summarizer)?);

    match cli.command {
        Command::Serve { bind } => serve(service, &cfg, bind).await,
        Command::Summarize { url, json } => {
            let summary = service.summarize_url(&url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}\n{}\n\n{}", summary.title, summary.url, summary.summary);
            }
            Ok(())
        }
        Command::Headlines {
            source,
            count,
            summarize,
        } => {
            let count = count.unwrap_or(cfg.headlines.default_count);
            let headlines = service.headlines(source, count).await?;
            if !summarize {
                for (i, h) in headlines.iter().enumerate() {
                    println!("{:>2}. {}\n    {}", i + 1, h.title, h.link);
                }
                return Ok(());
            }
            let mut results = futures::stream::iter(headlines.into_iter().enumerate())
                .map(|(i, h)| {
                    let service = service.clone();
                    async move {
                        let outcome = service.summarize_url(&h.link).await;
                        (i, h, outcome)
                    }
                })
                .buffered(SUMMARY_CONCURRENCY);
            while let Some((i, h, outcome)) = results.next().await {
                println!("{:>2}. {}\n    {}", i + 1, h.title, h.link);
                match outcome {
                    Ok(s) => println!("    AI Summary: {}\n", s.summary),
                    Err(e) => println!("    {}\n", e.card_message()),
                }
            }
            Ok(())
        }
    }
}

async fn serve(service: Arc<BriefService>, cfg: &BriefConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());

    let health = service.clone();
    tokio::spawn(async move {
        let ready = health.health_check().await;
        tracing::info!(model = %health.model_name(), ready, "summarizer.health");
    });

    let janitor = service.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(CACHE_PURGE_INTERVAL);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let removed = janitor.purge_expired();
            if removed > 0 {
                let stats = janitor.cache_stats();
                tracing::debug!(removed, articles = stats.articles, cards = stats.cards, "cache.purged");
            }
        }
    });

    let app = router(AppState {
        service,
        default_count: cfg.headlines.default_count,
    });
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!(addr = %listener.local_addr()?, "server.listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("server.shutdown");
        })
        .await?;
    Ok(())
}
