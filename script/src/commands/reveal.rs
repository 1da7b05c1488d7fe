use anyhow::Result;
use clap::Args;

use super::{print_header, render_reveal, spinner, token_id_or_prompt};
use crate::config::{NetworkArgs, Session};

/// Reveal a token's message
#[derive(Args, Debug)]
pub struct RevealCommand {
    /// Token to reveal
    #[arg(long, short = 't')]
    pub token_id: Option<String>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl RevealCommand {
    pub async fn execute(&self) -> Result<()> {
        print_header("🔓 SealMint - Reveal Command");

        let token_id = token_id_or_prompt(self.token_id.as_deref())?;
        let session = Session::connect(&self.network).await?;
        let workflow = session.workflow()?;

        let pb = spinner("green");
        pb.set_message(format!("Revealing token #{token_id}..."));
        let outcome = workflow.reveal(token_id).await;
        pb.finish_and_clear();

        let reveal = outcome?;
        println!("{}", render_reveal(token_id, &reveal));
        Ok(())
    }
}
