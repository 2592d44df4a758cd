use cli_table::{print_stdout, WithTitle};

use rst_common::with_logging::log::{debug, info};

use prople_wallet_core::invitation::looks_like_peer_identifier;

use crate::commands::handler::ContextHandler;
use crate::types::CliError;
use crate::utils::profile::{build_profile_path, read_profiles, save_profiles, Profile};

use super::ProfileCommands;

pub async fn handle_commands(
    ctx: &ContextHandler,
    commands: ProfileCommands,
) -> Result<(), CliError> {
    debug!("profile command handler triggered...");

    let profile_path = build_profile_path(&ctx.wallet_dir());
    match commands {
        ProfileCommands::Set(args) => {
            if !looks_like_peer_identifier(&args.did) {
                return Err(CliError::InputError(format!("invalid did: {}", args.did)));
            }

            let mut profiles = read_profiles(&profile_path)?;
            profiles.upsert(Profile::new(ctx.wallet_name(), args.did, args.label));
            save_profiles(&profile_path, &profiles)?;

            info!("[profile:set] profile saved for wallet {}", ctx.wallet_name());
        }
        ProfileCommands::List => {
            let profiles = read_profiles(&profile_path)?;
            print_stdout(profiles.profiles().with_title())
                .map_err(|err| CliError::OutputError(err.to_string()))?;
        }
    }

    Ok(())
}
