use crate::commands::{run_catalog, run_score, CatalogArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use support_qa::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Support QA Scorecard",
    about = "Score support interactions against the QA rubric and serve the evaluation API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a sheet of 1-10 grades and print the breakdown
    Score(ScoreArgs),
    /// Print the active rubric grouped by category
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Catalog(args) => run_catalog(args),
    }
}
