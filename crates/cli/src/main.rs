use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context as _,
    clap::Parser,
    secrecy::Secret,
    tracing::error,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    pictor_autoreply::RuleTable,
    pictor_discord::DiscordConfig,
    pictor_prefs::{JsonFileStore, PreferenceStore},
};

#[derive(Parser)]
#[command(name = "pictor", about = "pictor, a Discord media-mirroring bot")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Bot token, usually supplied via the environment.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: String,

    /// Address the liveness server binds to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port for the liveness server.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Path of the delivery-preference store.
    #[arg(long, default_value = "pictor-prefs.json")]
    prefs: PathBuf,

    /// Canned-reply rule table (JSON file). No file, no canned replies.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Cap on concurrently running media pipelines.
    #[arg(long, default_value_t = 4)]
    max_pipelines: usize,

    /// Per-HTTP-call timeout in seconds for metadata and download requests.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_rules(path: Option<&PathBuf>) -> anyhow::Result<RuleTable> {
    let Some(path) = path else {
        return Ok(RuleTable::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule table {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse rule table {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let rules = load_rules(cli.rules.as_ref())?;
    let prefs: Arc<dyn PreferenceStore> = Arc::new(
        JsonFileStore::open(cli.prefs.clone())
            .await
            .context("failed to open the preference store")?,
    );

    let config = DiscordConfig {
        token: Secret::new(cli.token.clone()),
        max_concurrent_pipelines: cli.max_pipelines,
        request_timeout_secs: cli.timeout_secs,
    };

    // Hosting platforms probe this route to keep the process alive.
    let bind = cli.bind.clone();
    let port = cli.port;
    tokio::spawn(async move {
        if let Err(e) = pictor_gateway::serve(&bind, port).await {
            error!(error = %e, "liveness server exited");
        }
    });

    pictor_discord::start(config, prefs, rules).await
}
