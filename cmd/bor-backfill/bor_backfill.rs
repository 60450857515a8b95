use bor_backfill::{cli::CLI, initializers::init_tracing};
use clap::Parser;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let CLI { log_level, command } = CLI::parse();

    init_tracing(log_level);

    command.run().await
}
