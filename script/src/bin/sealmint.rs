//! SealMint CLI - NFTs with an encrypted secret message
//!
//! Usage:
//! ```shell
//! # Mint a token
//! cargo run --bin sealmint -- mint --message "hello" --image art.png --private-key $PRIVATE_KEY
//!
//! # Reveal, transfer, list
//! cargo run --bin sealmint -- reveal --token-id 1
//! cargo run --bin sealmint -- transfer --token-id 1 --to 0x...
//! cargo run --bin sealmint -- gallery --reveal
//! ```

use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use console::Term;
use tracing_subscriber::EnvFilter;

use sealmint_script::commands::{
    ForgetCommand, GalleryCommand, MintCommand, RevealCommand, TransferCommand,
};

#[derive(Parser)]
#[command(
    name = "sealmint",
    about = "🔏 SealMint - NFTs with an encrypted secret message",
    long_about = "SealMint mints ERC-721 tokens whose message is stored on-chain encrypted.\n\nFeatures:\n• Mint with an image pinned to IPFS or stored inline\n• Reveal messages from this device's cache or through the FHE relayer\n• Transfer tokens; the sender's device forgets the message",
    version = "0.1.0"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Skip the banner
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// ✨ Mint a token with an encrypted message
    Mint(MintCommand),
    /// 📤 Transfer a token to another account
    Transfer(TransferCommand),
    /// 🔓 Reveal a token's message
    Reveal(RevealCommand),
    /// 🖼️ List the tokens of an account
    Gallery(GalleryCommand),
    /// 🧹 Drop this device's cached message for a token
    Forget(ForgetCommand),
}

fn print_banner() {
    let term = Term::stdout();
    let _ = term.clear_screen();

    println!(
        "{}",
        r#"
   ____             _ __  __ _       _
  / ___|  ___  __ _| |  \/  (_)_ __ | |_
  \___ \ / _ \/ _` | | |\/| | | '_ \| __|
   ___) |  __/ (_| | | |  | | | | | | |_
  |____/ \___|\__,_|_|_|  |_|_|_| |_|\__|
    "#
        .bright_magenta()
        .bold()
    );
    println!(
        "{}",
        "    Encrypted messages, minted".bright_cyan().italic()
    );
    println!("{}", "    ═══════════════════════════════════════".bright_black());
    println!();
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if !cli.quiet {
        print_banner();
    }

    let result = match &cli.command {
        Commands::Mint(cmd) => cmd.execute().await,
        Commands::Transfer(cmd) => cmd.execute().await,
        Commands::Reveal(cmd) => cmd.execute().await,
        Commands::Gallery(cmd) => cmd.execute().await,
        Commands::Forget(cmd) => cmd.execute().await,
    };

    match result {
        Ok(()) => {
            println!();
            println!(
                "{} {}",
                "✨".bright_green(),
                "Operation completed successfully!".bright_green().bold()
            );
        }
        Err(e) => {
            println!();
            eprintln!("{} {}", "💥".bright_red(), "Operation failed!".bright_red().bold());
            eprintln!("{} {}", "📋".bright_yellow(), "Error details:".bright_yellow());
            eprintln!("   {}", format!("{e:#}").bright_red());
            println!();
            eprintln!("{} {}", "💡".bright_blue(), "Tips:".bright_blue().bold());
            eprintln!("   • Check your private key format (should start with 0x)");
            eprintln!("   • Ensure CONTRACT_ADDRESS and your RPC provider are correct");
            eprintln!("   • Without PINATA_JWT, images must be under 100 KB");
            eprintln!("   • Run with --verbose for detailed logs");

            process::exit(1);
        }
    }
}
