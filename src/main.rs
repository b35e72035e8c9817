use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use symptom_scout_lib::commands::{self, analyze, history, HistoryLocation};
use symptom_scout_lib::config::AnalyzerConfig;

#[derive(Parser)]
#[command(name = "symptom-scout", version)]
#[command(about = "Structured symptom analysis with a local history", long_about = None)]
struct Cli {
    /// Directory holding persisted history (default: ~/SymptomScout/storage)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep history in memory only for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a free-text symptom description
    Analyze {
        /// Symptom description; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse or manage past analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List past analyses, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one past analysis
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete one past analysis
    Delete { id: String },
    /// Delete every past analysis
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    symptom_scout_lib::init_tracing();

    let location = HistoryLocation::resolve(cli.data_dir, cli.ephemeral);

    let outcome = match cli.command {
        Commands::Analyze { text, json } => run_analyze(&location, &text.join(" "), json),
        Commands::History { action } => run_history(&location, action),
    };

    match outcome {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_analyze(location: &HistoryLocation, text: &str, json: bool) -> Result<String, String> {
    let config = AnalyzerConfig::from_env();
    let analyzer = commands::build_analyzer(&config, location)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    let result = runtime.block_on(analyze::analyze_symptoms(&analyzer, text))?;

    if json {
        to_json(&result)
    } else {
        Ok(analyze::render_result(&result))
    }
}

fn run_history(location: &HistoryLocation, action: HistoryAction) -> Result<String, String> {
    let store = commands::open_history(location);

    match action {
        HistoryAction::List { json } => {
            let entries = history::list_history(&store);
            if json {
                to_json(&entries)
            } else {
                Ok(history::render_history_list(&entries))
            }
        }
        HistoryAction::Show { id, json } => {
            let entry = history::get_history_entry(&store, &id)?;
            if json {
                to_json(&entry)
            } else {
                Ok(history::render_history_entry(&entry))
            }
        }
        HistoryAction::Delete { id } => {
            history::delete_history_entry(&store, &id)?;
            Ok(format!("Deleted {id}\n"))
        }
        HistoryAction::Clear => {
            history::clear_history(&store);
            Ok("History cleared\n".into())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to serialize output: {e}"))
}
