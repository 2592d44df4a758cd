use cli_table::{print_stdout, WithTitle};

use rst_common::with_logging::log::{debug, info};

use crate::commands::handler::ContextHandler;
use crate::commands::types::InvitationRow;
use crate::types::CliError;

use super::LedgerCommands;

pub async fn handle_commands(
    ctx: &ContextHandler,
    commands: LedgerCommands,
) -> Result<(), CliError> {
    debug!("ledger command handler triggered...");

    let ledger = ctx.orchestrator().ledger();
    match commands {
        LedgerCommands::List => {
            let records = ledger
                .list()
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            let rows: Vec<InvitationRow> = records.into_iter().map(InvitationRow::from).collect();
            print_stdout(rows.with_title()).map_err(|err| CliError::OutputError(err.to_string()))?;
        }
        LedgerCommands::Clear => {
            let removed = ledger
                .clear_terminal()
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            info!("[ledger:clear] removed {} settled invitation(s)", removed);
        }
    }

    Ok(())
}
