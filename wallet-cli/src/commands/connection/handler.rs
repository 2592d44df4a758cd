use cli_table::{print_stdout, WithTitle};

use rst_common::with_logging::log::debug;

use prople_wallet_core::orchestrator::types::ComponentsBuilder;
use prople_wallet_core::orchestrator::ConnectionStoreBuilder;

use crate::commands::handler::ContextHandler;
use crate::commands::types::ConnectionRow;
use crate::types::CliError;

use super::ConnectionCommands;

pub async fn handle_commands(
    ctx: &ContextHandler,
    commands: ConnectionCommands,
) -> Result<(), CliError> {
    debug!("connection command handler triggered...");

    match commands {
        ConnectionCommands::List => {
            let connections = ctx
                .store()
                .connection_store()
                .list_connections()
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            let rows: Vec<ConnectionRow> =
                connections.into_iter().map(ConnectionRow::from).collect();
            print_stdout(rows.with_title()).map_err(|err| CliError::OutputError(err.to_string()))?;
        }
    }

    Ok(())
}
