use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser as ClapParser;
use clap::Subcommand;
use indexmap::IndexMap;
use namesfile::parser::parse_names;
use namesfile::schema::AttributeTable;
use serde::Serialize;
use std::time::Instant;

#[derive(clap::Parser)]
#[command(name = "namesfile")]
#[command(about = "Attribute schema (.names) parser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one or more names files into attribute tables.
    Parse(ParseCommand),
}

#[derive(clap::Args)]
struct ParseCommand {
    /// Path to the names file or directory containing names files.
    #[arg(value_name = "NAMES_[FILE|DIR]")]
    names: PathBuf,
    /// Pretty-print the output tables.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutTable {
    Ok(OkTable),
    ErrTable { error: String },
}

#[derive(Serialize)]
struct OkTable {
    table: AttributeTable,
}

fn output_table(names_file_path: &PathBuf) -> anyhow::Result<OutTable> {
    let names = std::fs::read_to_string(names_file_path).map_err(|_| {
        anyhow!(
            "Failed to read names file {}",
            names_file_path.display().to_string()
        )
    })?;
    let out_table = match parse_names(&names) {
        Ok(table) => OutTable::Ok(OkTable { table }),
        Err(err) => OutTable::ErrTable {
            error: format!(
                "Could not parse names file {} due to error: {}",
                names_file_path.display(),
                err
            ),
        },
    };
    Ok(out_table)
}

fn main() -> anyhow::Result<()> {
    let now = Instant::now();

    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Parse(parse_command) => {
            let names_file_or_dir = &parse_command.names;
            let out_str = if names_file_or_dir.is_dir() {
                let mut file_tables: IndexMap<String, OutTable> = IndexMap::new();
                let names_in_dir: Vec<_> = std::fs::read_dir(names_file_or_dir)?
                    .filter_map(|res| res.ok())
                    .map(|entry| entry.path())
                    .filter_map(|file| {
                        if file.extension().is_some_and(|ext| ext == "names") {
                            Some(file)
                        } else {
                            None
                        }
                    })
                    .collect();

                for names_file in names_in_dir {
                    let output_table = output_table(&names_file)?;
                    file_tables.insert(
                        std::path::absolute(names_file)?.display().to_string(),
                        output_table,
                    );
                }

                if parse_command.pretty {
                    serde_json::to_string_pretty(&file_tables)?
                } else {
                    serde_json::to_string(&file_tables)?
                }
            } else {
                let output_table = output_table(names_file_or_dir)?;
                if parse_command.pretty {
                    serde_json::to_string_pretty(&output_table)?
                } else {
                    serde_json::to_string(&output_table)?
                }
            };
            println!("{}", out_str);
        }
    }

    let elapsed = now.elapsed();
    log::info!("Elapsed: {:.2?}", elapsed);

    Ok(())
}
