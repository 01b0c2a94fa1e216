use clap::Parser;
use zai_vision::{logging, ClientConfig, VisionClient};

mod commands;
use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(commands::usage_exit_code(&e));
        }
    };

    if let Err(e) = logging::init_from_env() {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let outcome = match VisionClient::new(ClientConfig::from_env()) {
        Ok(client) => commands::run_command(&client, cli.command, cli.json).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!(kind = ?e.kind(), error = %e, "Command failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
