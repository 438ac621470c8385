use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use pdf_entity_extractor::{
    config::{dedupe_entity_types, parse_entity_types, word_limit, Configuration},
    core::EntityExtractor,
    handlers::DocumentProcessor,
    utils::{pretty_entities, write_extraction, write_summary},
};

#[derive(Parser)]
#[command(
    name = "pdf_entity_extractor",
    about = "Extract entities from or summarize PDF documents using an LLM",
    long_about = None,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(clap::Args)]
struct LlmArgs {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Google API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model to use (overrides config)
    #[arg(long)]
    model: Option<String>,

    /// Directory for the downloadable result file (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the result without writing a file
    #[arg(long)]
    no_save: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities from a document as JSON
    Extract {
        /// Input PDF or text file
        #[arg(short, long)]
        input: String,

        /// Entity type to extract (repeatable)
        #[arg(short, long = "entity")]
        entities: Vec<String>,

        /// File listing entity types, one per line
        #[arg(long)]
        entities_file: Option<PathBuf>,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Summarize a document
    Summarize {
        /// Input PDF or text file
        #[arg(short, long)]
        input: String,

        /// Maximum summary length in words, 0 for no limit
        #[arg(short, long)]
        max_length: Option<u32>,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Generate example configuration file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long)]
        output: PathBuf,

        /// Configuration format (yaml or json)
        #[arg(short, long, default_value = "yaml")]
        format: ConfigFormat,
    },
}

#[derive(clap::ValueEnum, Clone)]
enum ConfigFormat {
    Yaml,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Extract { input, entities, entities_file, llm } => {
            extract_command(input, entities, entities_file, llm).await
        }
        Commands::Summarize { input, max_length, llm } => {
            summarize_command(input, max_length, llm).await
        }
        Commands::Validate { config } => validate_command(config).await,
        Commands::GenerateConfig { output, format } => {
            generate_config_command(output, format).await
        }
    }
}

/// Loads the config (or the built-in example) and applies CLI overrides.
fn load_configuration(llm: &LlmArgs) -> Result<Configuration> {
    let mut config = match &llm.config {
        Some(path) => Configuration::from_file(path)?,
        None => Configuration::example(),
    };

    if let Some(key) = &llm.api_key {
        config.llm_settings.api_key = Some(key.clone());
    }
    if let Some(model) = &llm.model {
        config.llm_settings.model = model.clone();
    }
    if let Some(dir) = &llm.output_dir {
        config.output.directory = dir.display().to_string();
    }

    config.validate()?;
    Ok(config)
}

fn build_extractor(config: &Configuration) -> Result<EntityExtractor> {
    let api_key = config.llm_settings.api_key.clone()
        .filter(|key| !key.trim().is_empty())
        .context("Please provide a Google API key (--api-key or GOOGLE_API_KEY)")?;

    EntityExtractor::new(api_key, &config.llm_settings, config.safety_settings.clone())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn extract_command(
    input: String,
    entities: Vec<String>,
    entities_file: Option<PathBuf>,
    llm: LlmArgs,
) -> Result<()> {
    println!("{}", "Starting entity extraction...".bright_blue().bold());

    let config = load_configuration(&llm)?;

    let entity_types = if let Some(path) = entities_file {
        let content = tokio::fs::read_to_string(&path).await
            .with_context(|| format!("Failed to read entities file: {}", path.display()))?;
        parse_entity_types(&content)
    } else if !entities.is_empty() {
        dedupe_entity_types(&entities)
    } else {
        config.extraction.unique_entity_types()
    };

    println!(" Document: {}", input.bright_green());
    println!(" Entities: {}", entity_types.join(", ").bright_cyan());

    let extractor = build_extractor(&config)?;
    let document = DocumentProcessor::new().process(&input).await?;
    info!("Document loaded, text length: {}", document.text.len());
    println!(" Loaded: {}", document.describe().bright_green());

    let pb = spinner("Processing document...");
    let result = extractor.extract_entities(document.text, &entity_types).await;
    pb.finish_and_clear();

    let entities_json = result.map_err(|e| {
        error!("{}", e);
        anyhow::Error::new(e)
    })?;

    let pretty = pretty_entities(&entities_json)?;

    println!("\n{}", "Extracted Entities".bright_green().bold());
    println!("{}", pretty);

    if !llm.no_save {
        let path = write_extraction(Path::new(&config.output.directory), &entities_json).await?;
        println!(" Results written to: {}", path.display().to_string().bright_green());
    }

    Ok(())
}

async fn summarize_command(input: String, max_length: Option<u32>, llm: LlmArgs) -> Result<()> {
    println!("{}", "Starting summarization...".bright_blue().bold());

    let config = load_configuration(&llm)?;
    let limit = match max_length {
        Some(words) => word_limit(words),
        None => config.summary.limit(),
    };

    println!(" Document: {}", input.bright_green());
    match limit {
        Some(words) => println!(" Maximum length: {} words", words),
        None => println!(" Maximum length: no limit"),
    }

    let extractor = build_extractor(&config)?;
    let document = DocumentProcessor::new().process(&input).await?;
    info!("Document loaded, text length: {}", document.text.len());
    println!(" Loaded: {}", document.describe().bright_green());

    let pb = spinner("Generating summary...");
    let result = extractor.summarize(document.text, limit).await;
    pb.finish_and_clear();

    let summary = result.map_err(|e| {
        error!("{}", e);
        anyhow::Error::new(e)
    })?;

    println!("\n{}", "Summary".bright_green().bold());
    println!("{}", summary);

    if !llm.no_save {
        let path = write_summary(Path::new(&config.output.directory), &summary).await?;
        println!(" Summary written to: {}", path.display().to_string().bright_green());
    }

    Ok(())
}

async fn validate_command(config_path: PathBuf) -> Result<()> {
    println!("{}", " Validating configuration...".bright_blue().bold());

    match Configuration::from_file(&config_path) {
        Ok(config) => {
            match config.validate() {
                Ok(()) => {
                    println!(" Configuration is valid!");
                    println!(" Name: {}", config.name.bright_green());
                    println!(" Version: {}", config.version);
                    println!(" Model: {}", config.llm_settings.model);
                    println!(" Entity types: {}", config.extraction.entity_types.join(", "));
                    match &config.safety_settings {
                        Some(settings) => println!(" Safety settings: {} custom", settings.len()),
                        None => println!(" Safety settings: defaults"),
                    }
                    Ok(())
                }
                Err(e) => {
                    error!(" Configuration validation failed: {}", e);
                    Err(e)
                }
            }
        }
        Err(e) => {
            error!(" Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

async fn generate_config_command(output_path: PathBuf, format: ConfigFormat) -> Result<()> {
    println!("{}", " Generating example configuration...".bright_blue().bold());

    let config = Configuration::example();

    let content = match format {
        ConfigFormat::Yaml => serde_yaml::to_string(&config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
    };

    tokio::fs::write(&output_path, content).await?;

    println!(" Example configuration generated at: {}", output_path.display().to_string().bright_green());
    println!(" Edit the file to customize for your use case");

    Ok(())
}
