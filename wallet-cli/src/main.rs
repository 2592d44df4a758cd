use clap::{Parser, Subcommand};

use rst_common::with_logging::log::error;
use rst_common::with_tokio::tokio;
use rst_common::with_tracing::tracing_subscriber::{
    self, layer::SubscriberExt, util::SubscriberInitExt,
};

use prople_wallet_core::orchestrator::types::EngineSettings;
use prople_wallet_core::types::WalletID;
use prople_wallet_store::WalletStore;

use prople_wallet_cli::commands::connection::{connection_handler, ConnectionArgs};
use prople_wallet_cli::commands::handler::ContextHandler;
use prople_wallet_cli::commands::invitation::{invitation_handler, InvitationArgs};
use prople_wallet_cli::commands::ledger::{ledger_handler, LedgerArgs};
use prople_wallet_cli::commands::pin::{pin_handler, PinArgs};
use prople_wallet_cli::commands::profile::{profile_handler, ProfileArgs};
use prople_wallet_cli::commands::request::{request_handler, RequestArgs};
use prople_wallet_cli::types::{
    CliError, WALLET_CF_NAME, WALLET_DEFAULT_DIR, WALLET_DEFAULT_NAME,
};
use prople_wallet_cli::utils::db::{setup_database, setup_from_config};
use prople_wallet_cli::utils::homedir::WalletHome;

#[derive(Parser)]
#[command(name = "prople-wallet-cli")]
#[command(version = "0.1.0")]
#[command(long_about = None)]
struct Cli {
    /// Storage and engine config, built-in defaults are used when missing
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Wallet to act as
    #[arg(short, long, global = true, default_value = WALLET_DEFAULT_NAME)]
    wallet: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Profile(ProfileArgs),
    Invitation(InvitationArgs),
    Request(RequestArgs),
    Ledger(LedgerArgs),
    Pin(PinArgs),
    Connection(ConnectionArgs),
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let home = WalletHome::setup(WALLET_DEFAULT_DIR)?;

    let (executor, settings) = match cli.config {
        Some(conf_file) => setup_from_config(conf_file)?,
        None => {
            let executor = setup_database(home.data_dir(), WALLET_CF_NAME.to_string())?;
            (executor, EngineSettings::default())
        }
    };

    let store = WalletStore::new(executor, WalletID::from(cli.wallet.as_str()), settings);
    let mut ctx = ContextHandler::new(store, home.root(), cli.wallet);

    let result = match cli.command {
        Commands::Profile(args) => profile_handler(&ctx, args.commands).await,
        Commands::Invitation(args) => invitation_handler(&ctx, args.commands).await,
        Commands::Request(args) => request_handler(&ctx, args.commands).await,
        Commands::Ledger(args) => ledger_handler(&ctx, args.commands).await,
        Commands::Pin(args) => pin_handler(&ctx, args.commands).await,
        Commands::Connection(args) => connection_handler(&ctx, args.commands).await,
    };

    ctx.drain_events();
    result
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,prople_wallet_core=debug,prople_wallet_store=debug",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("{}", err);
        std::process::exit(1);
    }
}
