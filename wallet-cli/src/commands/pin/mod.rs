use clap::{Args, Subcommand};

mod handler;

pub use handler::handle_commands as pin_handler;

#[derive(Args, Clone)]
pub struct PinArgs {
    #[command(subcommand)]
    pub commands: PinCommands,
}

#[derive(Subcommand, Clone)]
#[command(subcommand_help_heading = "Pin")]
pub enum PinCommands {
    Show,

    /// Forgets a pinned identity so the next verified one gets pinned instead
    Reset {
        /// `ca` or `company`
        category: String,
    },
}
