use clap::{Args, Subcommand};

mod handler;

pub use handler::handle_commands as ledger_handler;

#[derive(Args, Clone)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub commands: LedgerCommands,
}

#[derive(Subcommand, Clone)]
#[command(subcommand_help_heading = "Ledger")]
pub enum LedgerCommands {
    List,

    /// Removes settled invitations without any pending decision
    Clear,
}
