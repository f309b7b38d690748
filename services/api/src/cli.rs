use crate::review::{run_list, ListArgs};
use crate::server;
use applicant_portal::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Applicant Portal",
    about = "Collect job applications over HTTP and list them for review",
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
    /// Inspect stored applicants without starting the server
    Applicants {
        #[command(subcommand)]
        command: ApplicantsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ApplicantsCommand {
    /// Print every stored applicant as JSON, newest first
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory holding the landing page and other static assets
    #[arg(long)]
    pub(crate) public_dir: Option<PathBuf>,
    /// Keep applicants in process memory instead of MongoDB
    #[arg(long)]
    pub(crate) in_memory: bool,
    /// Exit if MongoDB is unreachable at startup instead of running degraded
    #[arg(long)]
    pub(crate) require_storage: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Applicants {
            command: ApplicantsCommand::List(args),
        } => run_list(args).await,
    }
}
