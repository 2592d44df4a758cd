use cli_table::{print_stdout, WithTitle};

use rst_common::standard::chrono::Utc;
use rst_common::with_logging::log::{debug, info};

use prople_wallet_core::orchestrator::types::InboundDecision;
use prople_wallet_core::orchestrator::OrchestratorAPI;

use crate::commands::handler::ContextHandler;
use crate::commands::types::{ConnectionRow, RequestRow};
use crate::types::CliError;
use crate::utils::input::read_text;

use super::RequestCommands;

pub async fn handle_commands(
    ctx: &ContextHandler,
    commands: RequestCommands,
) -> Result<(), CliError> {
    debug!("request command handler triggered...");

    let orchestrator = ctx.orchestrator();
    match commands {
        RequestCommands::Receive { message } => {
            let text = read_text(&message)?;
            let message = orchestrator
                .codec()
                .decode_message(&text)
                .map_err(|err| CliError::InputError(err.to_string()))?;

            let decision = orchestrator
                .receive_connection_request(message)
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            match decision {
                InboundDecision::Prompt(item) => {
                    print_stdout(vec![RequestRow::from(item)].with_title())
                        .map_err(|err| CliError::OutputError(err.to_string()))?;
                }
                InboundDecision::Duplicate(id) => {
                    info!("[request:receive] already queued as {}", id);
                }
            }
        }
        RequestCommands::List { pending } => {
            let queue = orchestrator.queue();
            let items = match pending {
                true => queue.list_pending().await,
                false => queue.list().await,
            }
            .map_err(|err| CliError::EngineError(err.to_string()))?;

            let rows: Vec<RequestRow> = items.into_iter().map(RequestRow::from).collect();
            print_stdout(rows.with_title()).map_err(|err| CliError::OutputError(err.to_string()))?;
        }
        RequestCommands::Accept { id } => respond(ctx, id, true).await?,
        RequestCommands::Reject { id } => respond(ctx, id, false).await?,
        RequestCommands::Dedup => {
            let removed = orchestrator
                .queue()
                .deduplicate()
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            info!("[request:dedup] removed {} duplicated request(s)", removed);
        }
        RequestCommands::Cleanup => {
            let removed = orchestrator
                .queue()
                .cleanup_expired(Utc::now())
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            info!("[request:cleanup] removed {} expired request(s)", removed);
        }
    }

    Ok(())
}

async fn respond(ctx: &ContextHandler, id: String, accepted: bool) -> Result<(), CliError> {
    debug!("[request:respond] id: {id} | accepted: {accepted}");

    let outcome = ctx
        .orchestrator()
        .respond_to_request(id, accepted)
        .await
        .map_err(|err| CliError::EngineError(err.to_string()))?;

    print_stdout(vec![RequestRow::from(outcome.item)].with_title())
        .map_err(|err| CliError::OutputError(err.to_string()))?;

    if let Some(artifact) = outcome.artifact {
        print_stdout(vec![ConnectionRow::from(artifact)].with_title())
            .map_err(|err| CliError::OutputError(err.to_string()))?;
    }

    Ok(())
}
