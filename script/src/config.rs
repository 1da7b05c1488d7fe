//! Network configuration shared by every subcommand
//!
//! Each value can be given as a flag or through the environment (a `.env`
//! file is loaded first). The private key may also be given as `$VAR`, in
//! which case it is read from that environment variable, or omitted to be
//! prompted for.

use std::env;
use std::path::PathBuf;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::*;
use dialoguer::Password;
use tracing::{debug, info};

use sealmint_lib::store::DEFAULT_STORE_FILENAME;
use sealmint_lib::validation::parse_address;
use sealmint_lib::{FileStore, ImageHost, ImageUploader, MessageCache, RevealMode, Workflow};

use crate::chain::AlloyChain;
use crate::ipfs::{PinataHost, DEFAULT_IPFS_GATEWAY, DEFAULT_PINATA_API_URL};
use crate::relayer::RelayerClient;

pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";
pub const DEFAULT_CHAIN_ID: u64 = 11155111;

#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// RPC provider URL
    #[arg(long, short = 'r', env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Private key of the account (will prompt if not provided)
    #[arg(long, short = 'p', env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Address of the encrypted NFT contract
    #[arg(long, short = 'c', env = "CONTRACT_ADDRESS")]
    pub contract: String,

    #[arg(long, env = "CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// FHE relayer base URL; without it reveals fall back to the placeholder
    #[arg(long, env = "RELAYER_URL")]
    pub relayer_url: Option<String>,

    /// Verifying contract of the decryption authorization domain
    #[arg(long, env = "DECRYPTION_VERIFIER")]
    pub decryption_verifier: Option<String>,

    /// Pinata JWT; without it images are stored inline
    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    pub pinata_jwt: Option<String>,

    #[arg(long, env = "PINATA_API_URL", default_value = DEFAULT_PINATA_API_URL)]
    pub pinata_api_url: String,

    #[arg(long, env = "IPFS_GATEWAY", default_value = DEFAULT_IPFS_GATEWAY)]
    pub ipfs_gateway: String,

    /// Local plaintext cache file
    #[arg(long, env = "SEALMINT_CACHE", default_value = DEFAULT_STORE_FILENAME)]
    pub cache: PathBuf,

    /// `remote` tries relayer decryption on a cache miss, `local` never does
    #[arg(long, env = "REVEAL_MODE", default_value = "remote")]
    pub reveal_mode: RevealMode,

    /// Confirmations to wait for
    #[arg(long, default_value_t = 1)]
    pub confirmations: u64,
}

/// Expand environment variables in a string (e.g., "$PRIVATE_KEY" -> actual value)
pub fn expand_env_vars(input: &str) -> Result<String> {
    match input.strip_prefix('$') {
        Some(var_name) => {
            let value = env::var(var_name)
                .map_err(|_| anyhow!("Environment variable {} not found", var_name))?;
            debug!("expanded {} from the environment", input);
            Ok(value)
        }
        None => Ok(input.to_string()),
    }
}

/// `0x` followed by 64 hex characters
pub fn parse_private_key(input: &str) -> Result<PrivateKeySigner> {
    let key = expand_env_vars(input.trim())?;
    if !key.starts_with("0x") || key.len() != 66 {
        bail!("Private key must be a valid hex string starting with 0x");
    }
    key.parse::<PrivateKeySigner>()
        .map_err(|e| anyhow!("Invalid private key: {}", e))
}

impl NetworkArgs {
    pub fn contract_address(&self) -> Result<Address> {
        Ok(parse_address(&self.contract)?)
    }

    /// The configured verifier, or the NFT contract itself
    pub fn verifier_address(&self) -> Result<Address> {
        match &self.decryption_verifier {
            Some(verifier) => Ok(parse_address(verifier)?),
            None => self.contract_address(),
        }
    }

    pub fn signer(&self) -> Result<PrivateKeySigner> {
        let raw = match &self.private_key {
            Some(key) => key.clone(),
            None => {
                println!(
                    "{} {}",
                    "🔐".bright_blue(),
                    "Private key required for signing".bright_cyan()
                );
                Password::new()
                    .with_prompt("Enter your private key")
                    .interact()?
            }
        };
        parse_private_key(&raw)
    }

    pub fn uploader(&self) -> ImageUploader {
        let host = self
            .pinata_jwt
            .as_ref()
            .filter(|jwt| !jwt.is_empty())
            .map(|jwt| {
                Box::new(PinataHost::new(jwt.clone(), &self.pinata_api_url, &self.ipfs_gateway))
                    as Box<dyn ImageHost>
            });
        ImageUploader::new(host)
    }

    pub fn relayer(&self) -> Result<RelayerClient> {
        Ok(RelayerClient::new(
            self.relayer_url.clone().filter(|url| !url.is_empty()),
            self.chain_id,
            self.verifier_address()?,
        ))
    }
}

/// Connected collaborators for one CLI invocation
pub struct Session {
    pub chain: AlloyChain,
    pub fhe: RelayerClient,
    pub uploader: ImageUploader,
    cache_path: PathBuf,
    reveal_mode: RevealMode,
}

impl Session {
    pub async fn connect(args: &NetworkArgs) -> Result<Self> {
        let contract = args.contract_address()?;
        let signer = args.signer()?;
        let chain = AlloyChain::connect(&args.rpc_url, signer, contract)
            .await?
            .with_confirmations(args.confirmations);
        let uploader = args.uploader();
        info!(
            relayer = args.relayer_url.is_some(),
            image_host = uploader.has_host(),
            "session ready"
        );
        Ok(Self {
            chain,
            fhe: args.relayer()?,
            uploader,
            cache_path: args.cache.clone(),
            reveal_mode: args.reveal_mode,
        })
    }

    pub fn workflow(&self) -> Result<Workflow<'_>> {
        let store = FileStore::open_or_create(&self.cache_path)
            .with_context(|| format!("cannot open cache {}", self.cache_path.display()))?;
        let cache = MessageCache::new(Box::new(store));
        Ok(Workflow::new(&self.chain, &self.fhe, &self.uploader, cache)
            .with_reveal_mode(self.reveal_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        network: NetworkArgs,
    }

    const CONTRACT: &str = "0x1111111111111111111111111111111111111111";
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::try_parse_from([
            "sealmint",
            "--contract",
            CONTRACT,
            "--reveal-mode",
            "local",
            "--cache",
            "/tmp/cache.json",
        ])
        .unwrap();
        let network = cli.network;
        assert_eq!(network.reveal_mode, RevealMode::LocalOnly);
        assert_eq!(network.cache, PathBuf::from("/tmp/cache.json"));
        assert_eq!(network.contract_address().unwrap(), network.verifier_address().unwrap());
    }

    #[test]
    fn test_invalid_reveal_mode_is_rejected() {
        assert!(
            TestCli::try_parse_from(["sealmint", "--contract", CONTRACT, "--reveal-mode", "never"])
                .is_err()
        );
    }

    #[test]
    fn test_private_key_format() {
        let signer = parse_private_key(KEY).unwrap();
        assert_eq!(
            signer.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(parse_private_key("ac0974bec39a17e3").is_err());
        assert!(parse_private_key("$SEALMINT_TEST_UNSET_VARIABLE").is_err());
    }

    #[test]
    fn test_without_jwt_images_go_inline() {
        let cli = TestCli::try_parse_from(["sealmint", "--contract", CONTRACT, "--pinata-jwt", ""])
            .unwrap();
        assert!(!cli.network.uploader().has_host());
    }
}
