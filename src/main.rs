// Main entry point for the CLI application

use clap::Parser;
use enaho_merge::args::{Cli, Commands, OutputFormat};
use enaho_merge::config::MergeConfig;
use enaho_merge::etl::{ETLLoader, ModuleMappings};
use enaho_merge::logging;
use enaho_merge::merge::Merger;
use enaho_merge::preview::preview;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_found = cli.config.exists();
    let mut config = if config_found {
        MergeConfig::load_from_file(&cli.config)?
    } else {
        MergeConfig::default()
    };

    logging::init(&config.logging, cli.verbose);
    if !config_found {
        tracing::debug!(path = %cli.config.display(), "configuration file not found, using defaults");
    }

    match cli.command {
        Commands::Merge { mod100, mod200, output, rows, mappings, key_match, format } => {
            if let Some(rows) = rows {
                config.etl.row_cap = rows;
            }
            if let Some(mappings) = mappings {
                config.merge.mapping_version = mappings;
            }
            if let Some(key_match) = key_match {
                config.merge.key_match = key_match;
            }
            config.validate()?;

            let merger = Merger::from_config(&config)?;
            let mappings = ModuleMappings::for_version(config.merge.mapping_version);
            let outcome = merger.combine_and_save(
                &mod100,
                &mod200,
                &output,
                &mappings.module_100,
                &mappings.module_200,
                config.etl.row_cap,
            )?;

            match format {
                OutputFormat::Text => println!("{}", outcome.report.summary_line()),
                OutputFormat::Json => println!("{}", outcome.report.to_json()?),
            }
        }

        Commands::Inspect { mod100, mod200, rows, mappings } => {
            if let Some(rows) = rows {
                config.etl.row_cap = rows;
            }
            if let Some(mappings) = mappings {
                config.merge.mapping_version = mappings;
            }
            config.validate()?;

            let loader = ETLLoader::from_config(&config.etl)?;
            let mappings = ModuleMappings::for_version(config.merge.mapping_version);
            let module_100 = loader.load_and_rename(&mod100, &mappings.module_100, config.etl.row_cap)?;
            let module_200 = loader.load_and_rename(&mod200, &mappings.module_200, config.etl.row_cap)?;

            println!("✅ Module 100 columns ({} rows): {:?}", module_100.row_count(), module_100.columns());
            println!("✅ Module 200 columns ({} rows): {:?}", module_200.row_count(), module_200.columns());
        }

        Commands::Preview { file, head, column } => {
            let preview = preview(&file, head, &column)?;
            print!("{}", preview.render());
        }

        Commands::InitConfig { output } => {
            MergeConfig::default().save_to_file(&output)?;
            println!("✅ Created default configuration at: {}", output.display());
        }
    }

    Ok(())
}
