use clap::{Args, Subcommand};

mod handler;

pub use handler::handle_commands as connection_handler;

#[derive(Args, Clone)]
pub struct ConnectionArgs {
    #[command(subcommand)]
    pub commands: ConnectionCommands,
}

#[derive(Subcommand, Clone)]
#[command(subcommand_help_heading = "Connection")]
pub enum ConnectionCommands {
    List,
}
