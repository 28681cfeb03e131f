use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use propintake::core::PropertyType;
use propintake::core::dashboard::PropertyFilter;
use propintake::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for propintake::AppCommand {
    fn from(cmd: Commands) -> propintake::AppCommand {
        match cmd {
            Commands::Add { from } => propintake::AppCommand::Add { draft_path: from },
            Commands::Dashboard {
                property_type,
                start_date,
                end_date,
            } => propintake::AppCommand::Dashboard {
                filter: PropertyFilter::from_dates(property_type, start_date, end_date),
            },
            Commands::Show { id } => propintake::AppCommand::Show { id },
            Commands::Delete { id, yes } => propintake::AppCommand::Delete {
                id,
                assume_yes: yes,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Add a property through the step-by-step wizard
    Add {
        /// Pre-filled draft (YAML or JSON) to submit without prompting
        #[arg(long, value_name = "FILE")]
        from: Option<String>,
    },
    /// Display the property dashboard
    Dashboard {
        /// Only include properties of this type (House, Townhouse, Apartment)
        #[arg(long = "type", value_name = "TYPE")]
        property_type: Option<PropertyType>,
        /// Only include properties added on or after this date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Only include properties added on or before this date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// Display a single stored property
    Show {
        /// Property ID as assigned by the backend
        id: String,
    },
    /// Delete a stored property
    Delete {
        /// Property ID as assigned by the backend
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => propintake::cli::setup::setup(),
        Some(cmd) => propintake::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
