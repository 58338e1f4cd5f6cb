use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::Parser;
use inkdeck_core::{DeckRequest, Format};
use inkdeck_data::{load_build_config, load_candidates};
use inkdeck_engine::{
    DeckBuilder, EngineConfig, HashingEmbedder, MemoryIndex, OllamaEmbedder, OllamaGenerator,
    QdrantSearch,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const OFFLINE_DIMENSIONS: usize = 512;

/// Build a Lorcana deck from a free-text request and print it as JSON.
#[derive(Debug, Parser)]
#[command(name = "inkdeck", version)]
struct Cli {
    /// What the deck should be about, e.g. "aggressive pirates".
    request: String,
    #[arg(long, default_value_t = 60)]
    size: u32,
    /// Up to two inks; leave out to let the builder choose.
    #[arg(long = "ink", value_delimiter = ',')]
    inks: Vec<String>,
    #[arg(long, default_value = "core")]
    format: String,
    /// Date used for legality windows (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Directory holding build_config.json.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// Build offline from a JSON card file instead of the vector store.
    #[arg(long)]
    pool: Option<PathBuf>,
    /// Let the generator assemble the deck turn by turn.
    #[arg(long)]
    agent: bool,
    #[arg(long)]
    no_generator: bool,
    #[arg(long)]
    pretty: bool,
    #[arg(long, env = "INKDECK_COLLECTION")]
    collection: Option<String>,
    #[arg(long, env = "INKDECK_EMBED_URL")]
    embed_url: Option<String>,
    #[arg(long, env = "INKDECK_EMBED_MODEL")]
    embed_model: Option<String>,
    #[arg(long, env = "INKDECK_SEARCH_URL")]
    search_url: Option<String>,
    #[arg(long, env = "INKDECK_SEARCH_API_KEY", hide_env_values = true)]
    search_api_key: Option<String>,
    #[arg(long, env = "INKDECK_GENERATE_URL")]
    generate_url: Option<String>,
    #[arg(long, env = "INKDECK_GENERATE_MODEL")]
    generate_model: Option<String>,
    #[arg(long)]
    max_turns: Option<u32>,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(value) = &self.collection {
            config.collection = value.clone();
        }
        if let Some(value) = &self.embed_url {
            config.embed_url = value.clone();
        }
        if let Some(value) = &self.embed_model {
            config.embed_model = value.clone();
        }
        if let Some(value) = &self.search_url {
            config.search_url = value.clone();
        }
        if let Some(value) = &self.generate_url {
            config.generate_url = value.clone();
        }
        if let Some(value) = &self.generate_model {
            config.generate_model = value.clone();
        }
        if let Some(value) = self.max_turns {
            config.agent_max_iterations = value;
        }
        config.search_api_key = self.search_api_key.clone();
        config
    }

    fn deck_request(&self) -> anyhow::Result<DeckRequest> {
        let format = Format::from_name(&self.format)
            .ok_or_else(|| anyhow!("unknown format {:?}", self.format))?;
        let inks: Vec<&str> = self.inks.iter().map(String::as_str).collect();
        Ok(DeckRequest::new(self.request.clone(), self.size)
            .with_colors(&inks)
            .with_format(format))
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("inkdeck=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn builder(cli: &Cli, on: NaiveDate) -> anyhow::Result<DeckBuilder> {
    let config = cli.engine_config();
    let build = load_build_config(&cli.assets)
        .with_context(|| format!("load build config from {}", cli.assets.display()))?;

    let mut builder = match &cli.pool {
        Some(path) => {
            let (cards, warnings) = load_candidates(path)?;
            for warning in &warnings {
                warn!("card file: {warning}");
            }
            info!(cards = cards.len(), path = %path.display(), "building offline");
            let embedder = HashingEmbedder::new(OFFLINE_DIMENSIONS);
            let index = MemoryIndex::new(cards, &embedder, on);
            DeckBuilder::new(Arc::new(embedder), Arc::new(index))
        }
        None => DeckBuilder::new(
            Arc::new(OllamaEmbedder::new(&config)?),
            Arc::new(QdrantSearch::new(&config)?),
        ),
    };
    if !cli.no_generator {
        builder = builder.with_generator(Arc::new(OllamaGenerator::new(&config)?));
    }
    Ok(builder.with_config(config).with_build_config(build))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let on = cli.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let request = cli.deck_request()?;
    let builder = builder(&cli, on)?;

    let build = if cli.agent {
        builder.build_iterative_on(&request, on).await?
    } else {
        builder.build_on(&request, on).await?
    };
    let output = if cli.pretty {
        serde_json::to_string_pretty(&build.response)?
    } else {
        serde_json::to_string(&build.response)?
    };
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_request_and_config() {
        let cli = Cli::try_parse_from([
            "inkdeck",
            "aggressive pirates",
            "--size",
            "40",
            "--ink",
            "Ruby,Steel",
            "--format",
            "infinity",
            "--search-url",
            "http://qdrant:6333",
            "--max-turns",
            "5",
        ])
        .expect("parse");
        let request = cli.deck_request().expect("request");
        assert_eq!(request.target_size, 40);
        assert_eq!(request.colors, vec!["Ruby", "Steel"]);
        assert_eq!(request.format, Format::Infinity);
        let config = cli.engine_config();
        assert_eq!(config.search_url, "http://qdrant:6333");
        assert_eq!(config.agent_max_iterations, 5);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let cli = Cli::try_parse_from(["inkdeck", "songs", "--format", "vintage"]).expect("parse");
        assert!(cli.deck_request().is_err());
    }
}
