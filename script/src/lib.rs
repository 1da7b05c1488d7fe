//! SealMint command-line support
//!
//! Concrete collaborators for the `sealmint-lib` workflow:
//!
//! - [`chain::AlloyChain`]: contract calls through an alloy provider with a
//!   local signing key
//! - [`relayer::RelayerClient`]: encrypted inputs and user decryption over
//!   the FHE relayer's HTTP API
//! - [`ipfs::PinataHost`]: image pinning
//!
//! plus the clap configuration and the subcommands of the `sealmint` binary.

pub mod chain;
pub mod commands;
pub mod config;
pub mod ipfs;
pub mod relayer;
