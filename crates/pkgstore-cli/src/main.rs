//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};

use pkgstore_cli::handlers::stream::process_exit_status;
use pkgstore_cli::{Cli, Commands, handlers, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve(args) => handlers::serve::execute(args).await?,
        Commands::Stream(args) => match handlers::stream::execute(args).await {
            Ok(0) => {}
            Ok(code) => std::process::exit(process_exit_status(code)),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(e.exit_code());
            }
        },
    }

    Ok(())
}
