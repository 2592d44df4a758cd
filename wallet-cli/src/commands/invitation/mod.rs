use clap::{Args, Subcommand};

mod handler;

pub use handler::handle_commands as invitation_handler;

#[derive(Args, Clone)]
pub struct InvitationArgs {
    #[command(subcommand)]
    pub commands: InvitationCommands,
}

#[derive(Subcommand, Clone)]
#[command(subcommand_help_heading = "Invitation")]
pub enum InvitationCommands {
    /// Generates an invitation url for this wallet
    Create(CreateArgs),

    /// Shows what a transport string carries without touching the wallet state
    Decode { text: String },

    /// Receives an invitation and opens its preview
    Receive { text: String },

    /// Marks a received invitation as previewed
    Preview { id: String },

    /// Accepts an invitation, prints the connection request to deliver to the inviter
    Accept(AcceptArgs),

    /// Rejects a received invitation
    Reject { id: String },

    /// Pairs manually with a bare peer DID
    #[command(name = "connect-peer")]
    ConnectPeer(ConnectPeerArgs),
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    #[arg(long, default_value = "connect")]
    goal: String,

    #[arg(long)]
    goal_text: Option<String>,

    #[arg(long)]
    label: Option<String>,

    /// Credential proof to attach, inline or a file path
    #[arg(long)]
    credential: Option<String>,

    /// Presentation request to attach, inline json or a file path
    #[arg(long)]
    request: Option<String>,
}

#[derive(Args, Clone)]
pub struct AcceptArgs {
    text: String,

    /// Credential presented back to the inviter, inline or a file path
    #[arg(long)]
    credential: Option<String>,

    #[arg(long)]
    label: Option<String>,
}

#[derive(Args, Clone)]
pub struct ConnectPeerArgs {
    did: String,

    #[arg(long, required(true))]
    label: String,
}
