//! specforge CLI entrypoint
//! Parses command-line arguments and dispatches to the core compiler.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use specforge_core::{compile, GeneratorConfig, SpecDocument};
use tokio::fs;
use tracing::info;
use url::Url;

#[derive(Parser)]
#[command(name = "specforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Compile an API spec into an abstract client source tree
    Compile {
        /// Project name; also seeds the generated client name
        #[arg(long, default_value = "specforge_client")]
        project_name: String,
        /// Path or URL to the spec document (YAML or JSON)
        ///
        /// Can be a local file path or an HTTP/HTTPS URL
        /// Example: --schema-path path/to/schema.yaml
        /// Example: --schema-path https://example.com/openapi.json
        #[arg(long)]
        schema_path: String,
        /// Output file for the compiled tree (default: <project_name>.json)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Configuration file (YAML); flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,
        /// Explicit name for the generated client declaration
        #[arg(long)]
        client_name: Option<String>,
        /// Largest maxItems value compiled to a fixed-size array
        #[arg(long)]
        max_array_items: Option<u64>,
        /// Base URL override for the generated client (Optional)
        #[arg(long)]
        base_url: Option<Url>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Compile {
            project_name,
            schema_path,
            output,
            config,
            client_name,
            max_array_items,
            base_url,
        } => {
            let mut generator_config = match config {
                Some(path) => GeneratorConfig::from_file(path)
                    .await
                    .with_context(|| format!("Failed to load config from {}", path.display()))?,
                None => GeneratorConfig::new(project_name.clone()),
            };
            if let Some(name) = client_name {
                generator_config.client_name = Some(name.clone());
            }
            if let Some(limit) = max_array_items {
                generator_config.max_array_items = *limit;
            }
            if let Some(url) = base_url {
                generator_config.base_url = Some(url.clone());
            }

            info!("loading spec from {}", schema_path);
            let document = SpecDocument::from_file_or_url(schema_path)
                .await
                .with_context(|| format!("Failed to load spec from {}", schema_path))?;

            let tree = compile(&document, &generator_config)
                .with_context(|| format!("Failed to compile {}", schema_path))?;

            let output_path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("{}.json", generator_config.project_name)));
            if let Some(parent) = output_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent).await.with_context(|| {
                        format!("Failed to create output directory {}", parent.display())
                    })?;
                }
            }

            let rendered = serde_json::to_string_pretty(&tree)?;
            fs::write(&output_path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", output_path.display()))?;

            println!(
                "Compiled {} declaration(s) to {}",
                tree.declarations.len(),
                output_path.display()
            );
        }
    }
    Ok(())
}
