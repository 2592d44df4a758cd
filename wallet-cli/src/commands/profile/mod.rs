use clap::{Args, Subcommand};

mod handler;

pub use handler::handle_commands as profile_handler;

#[derive(Args, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub commands: ProfileCommands,
}

#[derive(Subcommand, Clone)]
#[command(subcommand_help_heading = "Profile")]
pub enum ProfileCommands {
    /// Sets the DID and label of the selected wallet
    Set(ProfileSetArgs),

    List,
}

#[derive(Args, Clone)]
pub struct ProfileSetArgs {
    #[arg(long, required(true))]
    did: String,

    #[arg(long, required(true))]
    label: String,
}
