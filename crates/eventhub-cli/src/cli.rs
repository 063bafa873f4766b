use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eventhub", version, about = "Create and update events")]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "eventhub.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a draft and send it to the events API
    Submit {
        /// TOML file holding the event draft
        #[arg(long)]
        draft: PathBuf,
        /// Image to attach to the event
        #[arg(long)]
        image: Option<PathBuf>,
        /// Update the event with this id instead of creating one
        #[arg(long)]
        update: Option<String>,
    },
    /// Check a draft without sending it
    Validate {
        #[arg(long)]
        draft: PathBuf,
    },
}
