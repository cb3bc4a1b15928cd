//! examkit CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use examkit_core::review::ResultFilter;

mod commands;

#[derive(Parser)]
#[command(name = "examkit", version, about = "TOEIC practice exams in the terminal")]
struct Cli {
    /// Exam server base URL (overrides config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available exams
    List,

    /// Show an exam's structure without starting an attempt
    Show {
        /// Exam id
        exam: u64,
    },

    /// Take an exam
    Take {
        /// Exam id
        exam: u64,

        /// Answer file (TOML: question number → answer); submits immediately
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// Review a submitted attempt
    Review {
        /// Attempt id
        attempt: u64,

        /// Which results to show: all, correct, incorrect
        #[arg(long, default_value = "all")]
        filter: ResultFilter,

        /// Print answer explanations
        #[arg(long)]
        explanations: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examkit=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let api = match commands::build_api(cli.base_url, cli.config.as_deref()) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::List => commands::list::execute(api).await,
        Commands::Show { exam } => commands::show::execute(api, exam).await,
        Commands::Take { exam, answers } => commands::take::execute(api, exam, answers).await,
        Commands::Review {
            attempt,
            filter,
            explanations,
        } => commands::review::execute(api, attempt, filter, explanations).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
