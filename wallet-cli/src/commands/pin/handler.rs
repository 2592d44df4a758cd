use cli_table::{print_stdout, WithTitle};

use rst_common::with_logging::log::{debug, info, warn};

use prople_wallet_core::pinning::types::{PinCategory, PinError};

use crate::commands::handler::ContextHandler;
use crate::commands::types::PinRow;
use crate::types::CliError;

use super::PinCommands;

pub async fn handle_commands(ctx: &ContextHandler, commands: PinCommands) -> Result<(), CliError> {
    debug!("pin command handler triggered...");

    let pins = ctx.orchestrator().pins();
    match commands {
        PinCommands::Show => {
            let mut rows: Vec<PinRow> = Vec::new();
            for category in PinCategory::all() {
                let pin = pins
                    .get_pin(category)
                    .await
                    .map_err(|err| CliError::EngineError(err.to_string()))?;

                if let Some(pin) = pin {
                    rows.push(PinRow::new(category, pin));
                }
            }

            print_stdout(rows.with_title()).map_err(|err| CliError::OutputError(err.to_string()))?;
        }
        PinCommands::Reset { category } => {
            let category: PinCategory = category
                .parse()
                .map_err(|err: PinError| CliError::InputError(err.to_string()))?;

            let removed = pins
                .reset(category)
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            match removed {
                Some(pin) => info!("[pin:reset] {} pin {} removed", category, pin.did()),
                None => warn!("[pin:reset] no {} pin to remove", category),
            }
        }
    }

    Ok(())
}
