use std::time::Duration;

use clap::Parser;

use apify_relay::banner::{BannerInfo, print_banner};
use apify_relay::config::{Config, RunConfig};
use apify_relay::consts::{
    DATASET_PREVIEW_LIMIT, DEFAULT_API_BASE, DEFAULT_HOST, DEFAULT_MAX_POLLS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PORT, DEFAULT_WAIT_FOR_FINISH_SECS,
};
use apify_relay::server;

#[derive(Parser)]
#[command(
    name = "apify-relay",
    version,
    about = "Relays a browser client to the Apify API with the caller's own token."
)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Interface to bind
    #[arg(long, env = "RELAY_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Upstream Apify API root
    #[arg(long, env = "APIFY_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Seconds the upstream may hold a run submission open
    #[arg(long, env = "RELAY_WAIT_FOR_FINISH", default_value_t = DEFAULT_WAIT_FOR_FINISH_SECS)]
    wait_for_finish: u64,

    /// Seconds between run status polls
    #[arg(long, env = "RELAY_POLL_INTERVAL", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval: u64,

    /// Maximum status polls after the synchronous wait
    #[arg(long, env = "RELAY_MAX_POLLS", default_value_t = DEFAULT_MAX_POLLS)]
    max_polls: u32,

    /// Skip the startup banner
    #[arg(long, default_value_t = false)]
    no_banner: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            host: self.host,
            port: self.port,
            api_base: self.api_base,
            run: RunConfig {
                wait_for_finish_secs: self.wait_for_finish,
                poll_interval: Duration::from_secs(self.poll_interval),
                max_polls: self.max_polls,
                dataset_preview_limit: DATASET_PREVIEW_LIMIT,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let show_banner = !cli.no_banner;
    let config = cli.into_config();

    if show_banner {
        print_banner(&BannerInfo {
            listen: &config.listen_addr(),
            upstream: &config.api_base,
            wait_for_finish_secs: config.run.wait_for_finish_secs,
            poll_interval_secs: config.run.poll_interval.as_secs(),
            max_polls: config.run.max_polls,
        });
    }

    server::serve(&config).await
}
