//! Main module for the Palate CLI application.
//!
//! Parses the command line, loads configuration and the menu catalog, wires
//! the collaborators together, and dispatches to the interactive chat, a
//! one-shot question, or configuration initialization.
//!
//! ```sh
//! palate init
//! palate chat --catalog menu_catalog.json
//! palate ask "anything warm and cheap?" --catalog menu_catalog.json
//! ```

use clap::Parser;
use once_cell::sync::OnceCell;
use std::{error::Error, fs, path::PathBuf, sync::Arc};
use tracing::debug;

use palate::{
    catalog::CatalogStore,
    client::OpenAiChat,
    commands::{Cli, Commands},
    config::{self, PalateConfig},
    config_dir,
    encoder::BertEncoder,
    repl,
    session::ChatSession,
};

static TRACING: OnceCell<()> = OnceCell::new();

fn main() -> Result<(), Box<dyn Error>> {
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt::init();
    });
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run())
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        return init();
    }

    let config_path = config_dir()?.join("config.yaml");
    debug!("loading config from {}", config_path.display());
    let config = config::load_config(config_path.to_string_lossy().as_ref())?;

    match cli.command {
        Commands::Chat { catalog } => {
            let mut session = build_session(&config, catalog)?;
            repl::interactive_mode(&mut session).await?;
        }
        Commands::Ask { question, catalog } => {
            let mut session = build_session(&config, catalog)?;
            let reply = session.chat(&question).await;
            println!("{reply}");
        }
        Commands::Init => unreachable!("handled above"),
    }

    Ok(())
}

/// Load the catalog and both collaborators and assemble a session.
///
/// The catalog path comes from the `--catalog` flag, falling back to
/// `catalog_path` in the configuration.
fn build_session(
    config: &PalateConfig,
    catalog_override: Option<PathBuf>,
) -> Result<ChatSession<OpenAiChat, BertEncoder>, Box<dyn Error>> {
    let catalog_path = catalog_override
        .or_else(|| config.catalog_path.as_ref().map(PathBuf::from))
        .ok_or("No catalog file: pass --catalog or set catalog_path in config.yaml")?;

    let catalog = Arc::new(CatalogStore::load(&catalog_path)?);
    eprintln!(
        "Loaded {} menu items from {}",
        catalog.len(),
        catalog_path.display()
    );

    let encoder = BertEncoder::load()?;
    if !catalog.is_empty() && encoder.dimension() != catalog.dimension() {
        return Err(format!(
            "encoder produces {}-d vectors but the catalog is {}-d",
            encoder.dimension(),
            catalog.dimension()
        )
        .into());
    }

    let client = OpenAiChat::from_config(config);
    Ok(ChatSession::new(catalog, encoder, client))
}

/// Write a starter `config.yaml` under the platform config directory.
fn init() -> Result<(), Box<dyn Error>> {
    let config_dir = config_dir()?;
    fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("config.yaml");
    let config = PalateConfig {
        api_base: "http://localhost:5001/v1".to_string(),
        api_key: "CHANGEME".to_string(),
        model: "llama-4-maverick".to_string(),
        catalog_path: Some("menu_catalog.json".to_string()),
    };
    let config_yaml = serde_yaml::to_string(&config)?;
    fs::write(&config_path, config_yaml)?;
    eprintln!("Wrote {}", config_path.display());

    Ok(())
}
