use cli_table::{print_stdout, WithTitle};

use rst_common::with_logging::log::{debug, info, warn};

use prople_wallet_core::invitation::attachment;
use prople_wallet_core::invitation::types::{DecodedInvitation, Goal, Invitation};
use prople_wallet_core::orchestrator::types::{
    AcceptParams, CreateInvitationParams, InvitationPreview, ReceiveDecision,
};
use prople_wallet_core::orchestrator::OrchestratorAPI;
use prople_wallet_core::types::InvitationID;

use crate::commands::handler::ContextHandler;
use crate::commands::types::{ConnectionRow, FieldRow, InvitationRow};
use crate::types::CliError;
use crate::utils::input::{read_credential, read_presentation_request, read_text};

use super::InvitationCommands;

fn invitation_rows(invitation: &Invitation) -> Vec<FieldRow> {
    let extracted = attachment::extract(&invitation.attachments);

    vec![
        FieldRow::new("id", &invitation.id),
        FieldRow::new("from", &invitation.from),
        FieldRow::new("goal", invitation.goal.code()),
        FieldRow::optional("goal text", invitation.goal_text.clone()),
        FieldRow::optional("label", invitation.label.clone()),
        FieldRow::new("attachments", invitation.attachment_ids().join(", ")),
        FieldRow::new("credential proof", extracted.proof.is_some()),
        FieldRow::new("presentation request", extracted.request.is_some()),
    ]
}

fn preview_rows(preview: &InvitationPreview) -> Vec<FieldRow> {
    let mut rows = invitation_rows(&preview.invitation);
    rows.push(FieldRow::new("kind", format!("{:?}", preview.kind)));
    rows.push(FieldRow::new("branch", format!("{:?}", preview.branch)));
    rows.push(FieldRow::optional(
        "pin category",
        preview.pin_category.map(|category| category.to_string()),
    ));

    if let Some(identity) = &preview.identity {
        let result = identity.validation_result();
        rows.push(FieldRow::new("verified", identity.is_verified()));
        rows.push(FieldRow::optional("issuer", result.issuer()));
        rows.push(FieldRow::optional(
            "expires at",
            result.expires_at().map(|at| at.to_rfc3339()),
        ));

        for (field, value) in identity.revealed_data() {
            rows.push(FieldRow::new(field, value));
        }

        for error in result.errors() {
            rows.push(FieldRow::new("error", error));
        }
    }

    if preview.credential_changed {
        rows.push(FieldRow::new(
            "warning",
            "credential differs from the pinned one",
        ));
    }

    rows
}

fn print_fields(rows: Vec<FieldRow>) -> Result<(), CliError> {
    print_stdout(rows.with_title()).map_err(|err| CliError::OutputError(err.to_string()))
}

pub async fn handle_commands(
    ctx: &ContextHandler,
    commands: InvitationCommands,
) -> Result<(), CliError> {
    debug!("invitation command handler triggered...");

    let orchestrator = ctx.orchestrator();
    match commands {
        InvitationCommands::Create(args) => {
            debug!("[invitation:create] goal: {}", args.goal);

            let profile = ctx.profile()?;
            let credential = args
                .credential
                .as_deref()
                .map(read_credential)
                .transpose()?;
            let request = args
                .request
                .as_deref()
                .map(read_presentation_request)
                .transpose()?;

            let record = orchestrator
                .create_invitation(CreateInvitationParams {
                    own_did: profile.did(),
                    goal: Goal::from_code(&args.goal),
                    goal_text: args.goal_text,
                    label: args.label.or(Some(profile.label())),
                    credential,
                    request,
                })
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            print_stdout(vec![InvitationRow::from(record.clone())].with_title())
                .map_err(|err| CliError::OutputError(err.to_string()))?;

            if let Some(url) = record.invitation_url() {
                println!("{}", url);
            }
        }
        InvitationCommands::Decode { text } => {
            let text = read_text(&text)?;
            let decoded = orchestrator
                .codec()
                .decode(&text)
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            match decoded {
                DecodedInvitation::RawIdentifier(identifier) => {
                    info!("[invitation:decode] raw peer identifier: {}", identifier);
                    print_fields(vec![
                        FieldRow::new("kind", "RawIdentifier"),
                        FieldRow::new("identifier", identifier),
                    ])?;
                }
                other => {
                    let mut rows = vec![FieldRow::new("kind", format!("{:?}", other.kind()))];
                    if let Some(invitation) = other.invitation() {
                        rows.extend(invitation_rows(invitation));
                    }
                    print_fields(rows)?;
                }
            }
        }
        InvitationCommands::Receive { text } => {
            let text = read_text(&text)?;
            let decision = orchestrator
                .receive_supervised(&text)
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            match decision {
                None => info!("[invitation:receive] nothing to receive"),
                Some(ReceiveDecision::RawPeer(identifier)) => {
                    info!(
                        "[invitation:receive] {} is a bare peer identifier, use `invitation connect-peer`",
                        identifier
                    );
                }
                Some(ReceiveDecision::OpenPreview(preview)) => print_fields(preview_rows(&preview))?,
            }
        }
        InvitationCommands::Preview { id } => {
            let advance = orchestrator
                .preview_invitation(InvitationID::from(id))
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            print_stdout(vec![InvitationRow::from(advance.record().clone())].with_title())
                .map_err(|err| CliError::OutputError(err.to_string()))?;
        }
        InvitationCommands::Accept(args) => {
            let profile = ctx.profile()?;
            let text = read_text(&args.text)?;
            let credential = args
                .credential
                .as_deref()
                .map(read_credential)
                .transpose()?;

            let outcome = orchestrator
                .accept_invitation(
                    &text,
                    AcceptParams {
                        own_did: profile.did(),
                        label: args.label.unwrap_or(profile.label()),
                        credential,
                    },
                )
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            if outcome.fallback {
                warn!("[invitation:accept] paired manually, no connection request to deliver");
            }

            if let Some(pin) = &outcome.pin {
                info!("[invitation:accept] pin outcome: {:?}", pin);
            }

            if let Some(err) = &outcome.pin_error {
                warn!("[invitation:accept] connected, but the sender was not pinned: {}", err);
            }

            print_stdout(vec![ConnectionRow::from(outcome.artifact)].with_title())
                .map_err(|err| CliError::OutputError(err.to_string()))?;

            if let Some(message) = outcome.request_message {
                println!("{}", message);
            }
        }
        InvitationCommands::Reject { id } => {
            let advance = orchestrator
                .reject_invitation(InvitationID::from(id))
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            if !advance.is_advanced() {
                warn!(
                    "[invitation:reject] invitation stays {}",
                    advance.record().status()
                );
            }

            print_stdout(vec![InvitationRow::from(advance.record().clone())].with_title())
                .map_err(|err| CliError::OutputError(err.to_string()))?;
        }
        InvitationCommands::ConnectPeer(args) => {
            let profile = ctx.profile()?;
            let artifact = orchestrator
                .connect_raw_peer(profile.did(), args.did, args.label)
                .await
                .map_err(|err| CliError::EngineError(err.to_string()))?;

            print_stdout(vec![ConnectionRow::from(artifact)].with_title())
                .map_err(|err| CliError::OutputError(err.to_string()))?;
        }
    }

    Ok(())
}
