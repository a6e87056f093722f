//! # pay-cli
//!
//! Terminal host for mp-checkout-rs.
//!
//! This crate provides:
//! - `mp-checkout` binary with clap-based subcommands
//! - Terminal implementations of the checkout host capabilities
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `config` | Validate configuration |
//! | `pay <ID_URL> <QUANTITY>` | Create a preference, print the hosted checkout URL |
//! | `verify <PAYMENT_ID>` | Verify a payment |
//! | `return <URL>` | Parse a return URL and verify the payment it names |

pub mod cli;
pub mod commands;
pub mod host;

pub use cli::{Cli, Command};
pub use commands::execute;
