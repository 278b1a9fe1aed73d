use crate::etl::MappingVersion;
use crate::merge::KeyMatch;
use crate::preview::{DEFAULT_PREVIEW_COLUMN, DEFAULT_PREVIEW_ROWS};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "enahomerge")]
#[command(about = "Merges ENAHO module 100 and module 200 extracts on the household key.")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // Configuration file path, ignored when absent
    #[arg(short, long, default_value = "enaho.yaml", global = true)]
    pub config: PathBuf,

    // Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    // Join module 100 and module 200 and write the merged CSV
    Merge {
        mod100: PathBuf,

        mod200: PathBuf,

        output: PathBuf,

        // Rows read from each extract
        #[arg(short, long)]
        rows: Option<usize>,

        // Rename mapping version
        #[arg(short, long, value_enum)]
        mappings: Option<MappingVersion>,

        // How key cells are compared
        #[arg(short, long, value_enum)]
        key_match: Option<KeyMatch>,

        // Summary format (text, json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    // Load and rename both extracts and print their columns
    Inspect {
        mod100: PathBuf,

        mod200: PathBuf,

        #[arg(short, long)]
        rows: Option<usize>,

        #[arg(short, long, value_enum)]
        mappings: Option<MappingVersion>,
    },

    // Show the first rows of a merged file and the value counts of one column
    Preview {
        file: PathBuf,

        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        head: usize,

        #[arg(long, default_value = DEFAULT_PREVIEW_COLUMN)]
        column: String,
    },

    // Generate default configuration file
    InitConfig {
        #[arg(short, long, default_value = "enaho.yaml")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
