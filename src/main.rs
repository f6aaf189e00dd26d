use clap::{Parser, Subcommand};
use deliverator::{
    Registry,
    api::{self, BungieClient, RemoteApi},
    config::Config,
    models::types::{CharacterId, ItemId, Owner, PlatformType},
    net::http,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "deliverator", version, about = "Inventory manager for a game account")]
struct Cli {
    /// TOML config file; the environment is used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the profile and print the bucket view
    Profile {
        #[arg(long)]
        platform: Option<i32>,
    },
    /// Move items between characters, the vault and account storage
    Transfer {
        #[arg(long)]
        from: Owner,
        #[arg(long)]
        to: Owner,
        #[arg(long)]
        item: ItemId,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        platform: Option<i32>,
    },
    /// Equip an item on a character
    Equip {
        #[arg(long)]
        character: CharacterId,
        #[arg(long)]
        item: ItemId,
        #[arg(long)]
        platform: Option<i32>,
    },
    /// Show where the definitions database lives and whether ours is stale
    Manifest {
        /// Record the current location next to the local database
        #[arg(long)]
        record: bool,
    },
    /// Serve the JSON API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let cfg = Arc::new(match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    });

    match cli.command {
        Command::Manifest { record } => {
            let client = BungieClient::new(&cfg)?;
            let hint = api::hint_path_for(&cfg.manifest_path);
            let location =
                api::locate_manifest(&client as &dyn RemoteApi, &cfg.language, cfg.bootstrap_timeout(), &hint).await?;
            println!("{}", serde_json::to_string_pretty(&location)?);
            println!("download: {}", location.download_url());
            if record {
                api::write_hint(&hint, &location.location)?;
            }
        }
        Command::Profile { platform } => {
            let registry = Registry::open(cfg.clone()).await?;
            let summary = registry.services.profile.fetch_profile(platform.map(PlatformType)).await?;
            tracing::info!(items = summary.items, characters = summary.characters, "profile loaded");

            let snapshot = registry.store.snapshot();
            for character in snapshot.sorted_characters() {
                let marker = if snapshot.active_character.as_ref() == Some(&character.id) { "*" } else { " " };
                println!("{marker} {} {}", character.id, character.title());
            }
            for bucket in snapshot.buckets() {
                println!("\n[{}]", bucket.name);
                for (column, ids) in [("active", &bucket.active), ("storage", &bucket.inactive)] {
                    for id in ids {
                        if let Some(item) = snapshot.inventory.get(id) {
                            println!("  {column:<8} {:<24} {} @ {}", item.id, item.display_text(), item.owner);
                        }
                    }
                }
            }
        }
        Command::Transfer {
            from,
            to,
            item,
            quantity,
            platform,
        } => {
            let registry = Registry::open(cfg.clone()).await?;
            registry.services.profile.fetch_profile(platform.map(PlatformType)).await?;
            registry.services.transfer.transfer(&from, &to, &item, quantity).await?;
            println!("moved {quantity} of {item} from {from} to {to}");
        }
        Command::Equip {
            character,
            item,
            platform,
        } => {
            let registry = Registry::open(cfg.clone()).await?;
            registry.services.profile.fetch_profile(platform.map(PlatformType)).await?;
            let outcome = registry.services.transfer.equip(&character, &item).await?;
            println!("{}", serde_json::to_string(&outcome)?);
        }
        Command::Serve => {
            let registry = Arc::new(Registry::open(cfg.clone()).await?);
            let addr: SocketAddr = cfg.http_addr.parse()?;
            tracing::info!(%addr, "deliverator http listening");
            http::serve(addr, registry).await?;
        }
    }

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, prelude::*};

    color_eyre::install().map_err(|e| anyhow::anyhow!("{e}"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,deliverator=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::uptime()),
        )
        .with(tracing_error::ErrorLayer::default())
        .init();
    Ok(())
}
