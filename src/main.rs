use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use signal_gateway::bootstrap;
use signal_gateway::cli::{Cli, Command, run_broadcast, run_send_to_phone};
use signal_gateway::config::Config;
use signal_gateway::error::ServerError;
use signal_gateway::web::{GatewayState, start_server};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        None => exit_status(serve(false).await),
        Some(Command::Serve { demo }) => exit_status(serve(demo).await),
        // Invokers print their own failure report.
        Some(Command::SendToPhone {
            phone_number,
            message,
            backend,
        }) => run_send_to_phone(&backend, &phone_number, &message).await,
        Some(Command::Broadcast {
            phone_numbers,
            message,
            backend,
        }) => run_broadcast(&backend, &phone_numbers, &message).await,
    }
}

fn exit_status(result: signal_gateway::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(demo_flag: bool) -> signal_gateway::Result<()> {
    let config = Config::from_env()?;
    bootstrap::init_tracing(config.gateway.log_format);

    let state = if demo_flag || config.gateway.demo {
        GatewayState::demo()
    } else {
        GatewayState::live(&config.signal)?
    };
    let state = Arc::new(state);

    bootstrap::log_startup(&config, &state);
    let server = start_server(
        &config.gateway.bind_addr(),
        state.clone(),
        &config.gateway.cors_origins,
    )
    .await?;
    tracing::info!(addr = %server.addr, "Gateway listening");
    bootstrap::spawn_provider_probe(state);

    tokio::signal::ctrl_c().await.map_err(ServerError::from)?;
    server.shutdown().await?;
    Ok(())
}
