mod options;
mod render;

use clap::{Parser, Subcommand};
use countrypop::services::AggregationService;
use serde::Serialize;

use options::GlobalArgs;

/// Country capitals, flags and populations from public REST APIs
#[derive(Parser)]
#[command(name = "countrypop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: GlobalArgs,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List all countries sorted by name
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one country (case-insensitive name)
    Get {
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find countries whose name contains QUERY
    Search {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show city population series for a country
    Cities {
        country: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-country population density and map colors
    Visualize {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Print `value` as pretty JSON or through its text renderer
fn emit<T>(value: &T, json: bool, text: impl FnOnce(&T) -> String) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text(value));
    }
    Ok(())
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = self.options.resolve()?;
        tracing::debug!(profile = ?config.profile, "configuration resolved");
        let service = AggregationService::from_config(&config)?;

        match self.command {
            Commands::List { json } => {
                let countries = service.list_all()?;
                emit(countries.as_slice(), json, render::render_countries)
            }
            Commands::Get { name, json } => {
                let country = service.get_by_name(&name)?;
                emit(&country, json, render::render_country)
            }
            Commands::Search { query, json } => {
                let countries = service.search(&query)?;
                emit(countries.as_slice(), json, render::render_countries)
            }
            Commands::Cities { country, json } => {
                let entries = service.get_city_populations(&country)?;
                emit(entries.as_slice(), json, |e| render::render_cities(&country, e))
            }
            Commands::Visualize { json } => {
                let data = service.get_visualization_data()?;
                emit(data.as_slice(), json, render::render_visualization)
            }
        }
    }
}
