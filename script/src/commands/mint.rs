use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use dialoguer::{Confirm, Input};

use sealmint_lib::validation::{validate_message, MAX_INLINE_BYTES, MAX_MESSAGE_CHARS};
use sealmint_lib::{ImageFile, MintStatus};

use super::{follow_status, print_header, spinner};
use crate::config::{NetworkArgs, Session};

/// Mint a token with an encrypted message and an image
#[derive(Args, Debug)]
pub struct MintCommand {
    /// Secret message (at most 100 characters)
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Image file to attach
    #[arg(long, short = 'i')]
    pub image: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl MintCommand {
    pub async fn execute(&self) -> Result<()> {
        print_header("✨ SealMint - Mint Command");

        let message = match &self.message {
            Some(message) => message.clone(),
            None => Input::<String>::new()
                .with_prompt(format!(
                    "{} Secret message (max {} characters)",
                    "💬".bright_yellow(),
                    MAX_MESSAGE_CHARS
                ))
                .interact_text()?,
        };
        validate_message(&message)?;

        let path = match &self.image {
            Some(path) => path.clone(),
            None => PathBuf::from(
                Input::<String>::new()
                    .with_prompt(format!("{} Image file", "🖼️".bright_yellow()))
                    .interact_text()?,
            ),
        };
        let image = ImageFile::from_path(&path)
            .with_context(|| format!("cannot read image {}", path.display()))?;
        image.validate()?;

        let session = Session::connect(&self.network).await?;
        let workflow = session.workflow()?;

        println!();
        println!("{}", "📋 Mint Details".bright_green().bold());
        println!("{}", "─".repeat(30).bright_black());
        println!("{} {} characters", "Message:".bright_white(), message.chars().count());
        println!(
            "{} {} ({}, {} bytes)",
            "Image:".bright_white(),
            image.name.bright_cyan(),
            image.mime_type,
            image.size()
        );
        println!("{} {}", "Account:".bright_white(), workflow.account().to_string().bright_cyan());
        if !session.uploader.has_host() {
            println!(
                "{} No image host configured; the image is stored inline (must be under {} bytes)",
                "ℹ️".bright_blue(),
                MAX_INLINE_BYTES
            );
        }

        if !self.yes {
            println!();
            let confirmed = Confirm::new()
                .with_prompt(format!("{} Mint this token?", "⚠️".bright_yellow()))
                .default(true)
                .interact()?;
            if !confirmed {
                println!("{} Operation cancelled by user", "🚫".bright_red());
                return Ok(());
            }
        }

        println!();
        let pb = spinner("magenta");
        let (_, outcome) = tokio::join!(
            follow_status(workflow.subscribe_mint(), &pb, MintStatus::is_terminal),
            workflow.mint(&message, &image)
        );

        match outcome {
            Ok(minted) => {
                pb.finish_with_message(format!("✅ Minted token #{}", minted.token_id));
                println!();
                println!("{} {}", "Token:".bright_white(), minted.token_id.to_string().bright_green());
                println!("{} {}", "Transaction:".bright_white(), minted.tx_hash);
                if minted.upload.is_inline() {
                    println!("{} stored inline", "Image:".bright_white());
                } else {
                    println!("{} {}", "Image:".bright_white(), minted.upload.on_chain_uri);
                    println!("{} {}", "Preview:".bright_white(), minted.upload.preview_url.bright_cyan());
                }
                Ok(())
            }
            Err(e) => {
                pb.abandon_with_message(format!("❌ {}", workflow.mint_status()));
                Err(e.into())
            }
        }
    }
}
