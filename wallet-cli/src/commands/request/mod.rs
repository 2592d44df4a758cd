use clap::{Args, Subcommand};

mod handler;

pub use handler::handle_commands as request_handler;

#[derive(Args, Clone)]
pub struct RequestArgs {
    #[command(subcommand)]
    pub commands: RequestCommands,
}

#[derive(Subcommand, Clone)]
#[command(subcommand_help_heading = "Connection Request")]
pub enum RequestCommands {
    /// Queues an inbound connection request message, inline json or a file path
    Receive { message: String },

    List {
        /// Only requests still waiting for a decision
        #[arg(long)]
        pending: bool,
    },

    Accept { id: String },

    Reject { id: String },

    /// Removes duplicated requests sharing the same message id
    Dedup,

    /// Removes resolved requests past their expiry
    Cleanup,
}
