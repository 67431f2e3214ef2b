use crate::demo::{print_engine_config, run_demo, run_evaluate, DemoArgs, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use riskalloc::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "riskalloc",
    about = "Score market conditions and derive a portfolio allocation from the command line",
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
    /// Evaluate a readings CSV for one allocation profile
    Evaluate(EvaluateArgs),
    /// Walk the bundled sample snapshot through every pipeline stage
    Demo(DemoArgs),
    /// Print the effective engine configuration as JSON
    Config,
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
        Command::Evaluate(args) => run_evaluate(args),
        Command::Demo(args) => run_demo(args),
        Command::Config => print_engine_config(),
    }
}
