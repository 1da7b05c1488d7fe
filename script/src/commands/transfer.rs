use anyhow::Result;
use clap::Args;
use colored::*;
use dialoguer::{Confirm, Input};

use sealmint_lib::validation::parse_address;
use sealmint_lib::TransferStatus;

use super::{follow_status, print_header, spinner, token_id_or_prompt};
use crate::config::{NetworkArgs, Session};

/// Transfer a token; this device forgets its message afterwards
#[derive(Args, Debug)]
pub struct TransferCommand {
    /// Token to transfer
    #[arg(long, short = 't')]
    pub token_id: Option<String>,

    /// Recipient address
    #[arg(long)]
    pub to: Option<String>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl TransferCommand {
    pub async fn execute(&self) -> Result<()> {
        print_header("📤 SealMint - Transfer Command");

        let token_id = token_id_or_prompt(self.token_id.as_deref())?;
        let to = match &self.to {
            Some(to) => to.clone(),
            None => Input::<String>::new()
                .with_prompt(format!("{} Recipient address", "📬".bright_yellow()))
                .interact_text()?,
        };
        let recipient = parse_address(&to)?;

        let session = Session::connect(&self.network).await?;
        let workflow = session.workflow()?;

        println!();
        println!("{}", "📋 Transfer Details".bright_green().bold());
        println!("{}", "─".repeat(30).bright_black());
        println!("{} #{}", "Token:".bright_white(), token_id);
        println!("{} {}", "From:".bright_white(), workflow.account().to_string().bright_cyan());
        println!("{} {}", "To:".bright_white(), recipient.to_string().bright_cyan());

        if !self.yes {
            println!();
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "{} Transfer token #{}? The new owner cannot see your cached message.",
                    "⚠️".bright_yellow(),
                    token_id.to_string().bright_red().bold()
                ))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("{} Operation cancelled by user", "🚫".bright_red());
                return Ok(());
            }
        }

        println!();
        let pb = spinner("blue");
        let (_, outcome) = tokio::join!(
            follow_status(workflow.subscribe_transfer(), &pb, TransferStatus::is_terminal),
            workflow.transfer(&to, token_id)
        );

        match outcome {
            Ok(tx_hash) => {
                pb.finish_with_message(format!("✅ Transferred token #{token_id}"));
                println!("{} {}", "Transaction:".bright_white(), tx_hash);
                Ok(())
            }
            Err(e) => {
                pb.abandon_with_message(format!("❌ {}", workflow.transfer_status()));
                Err(e.into())
            }
        }
    }
}
