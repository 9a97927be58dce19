//! Aigean Mosaic CLI
//!
//! Combine satellite tiles into mosaics and inspect their metadata.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aigean_mosaic::config::SAMPLE_CONFIG;
use aigean_mosaic::io::describe;
use aigean_mosaic::{run_mosaic, Config, MetadataReport, TileLoader};

#[derive(Parser)]
#[command(name = "aigean-mosaic")]
#[command(about = "Mosaic Aigean satellite tiles", long_about = None)]
struct Cli {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the directory tile files are read from
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the output resolution
    #[arg(long, global = true)]
    resolution: Option<u32>,

    /// Crop the mosaic instead of zero-padding it to the full union
    #[arg(long, global = true)]
    no_padding: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mosaic tiles into one (default if no command specified)
    Mosaic {
        /// Tile files, relative to the data directory (default: from the config)
        files: Vec<String>,
    },

    /// Print the metadata of tile files
    Metadata {
        /// Tile files, relative to the data directory
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Validate configuration
    Validate,

    /// Generate a sample configuration file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        None => mosaic_command(&cli, &[])?,

        Some(Commands::Mosaic { files }) => mosaic_command(&cli, files)?,

        Some(Commands::Metadata { files }) => metadata_command(&cli, files)?,

        Some(Commands::Validate) => validate_command(&cli)?,

        Some(Commands::GenerateConfig { output }) => generate_config_command(output)?,
    }

    Ok(())
}

/// Config file (or defaults) with the command-line overrides applied.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Apply overrides
    if let Some(dir) = &cli.data_dir {
        config.input.data_dir = dir.clone();
    }
    if let Some(resolution) = cli.resolution {
        config.mosaic.resolution = Some(resolution);
    }
    if cli.no_padding {
        config.mosaic.padding = false;
    }

    Ok(config)
}

fn mosaic_command(cli: &Cli, files: &[String]) -> Result<()> {
    let mut config = load_config(cli)?;
    if !files.is_empty() {
        config.input.files = files.to_vec();
    }

    let result = run_mosaic(&config)?;

    println!("\n=== Mosaic ===");
    println!("Tiles: {}", config.input.files.len());
    for (key, value) in describe(result.meta()) {
        println!("{}: {}", key, value);
    }
    println!("Shape: {:?}", result.shape());
    println!("Output name: {}", result.output_filename());
    println!("==============\n");

    Ok(())
}

fn metadata_command(cli: &Cli, files: &[String]) -> Result<()> {
    let config = load_config(cli)?;
    let loader = TileLoader::new(&config.input.data_dir);

    let report = MetadataReport::collect(&loader, files);
    print!("{}", report);

    if report.entries.is_empty() {
        anyhow::bail!("None of the {} files could be read", files.len());
    }
    Ok(())
}

fn validate_command(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    config.validate()?;
    println!("Configuration is valid");
    Ok(())
}

fn generate_config_command(output: &Path) -> Result<()> {
    std::fs::write(output, SAMPLE_CONFIG)?;
    println!("Generated sample configuration at: {}", output.display());

    Ok(())
}
