//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Orderboard - restaurant kitchen and delivery boards
#[derive(Parser)]
#[command(
    name = "ob",
    about = "Kitchen kanban and courier dispatch boards for a restaurant order service",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the delivery board from the order service and print it
    Deliveries {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Accept a READY order (waits for the order service)
    Accept { id: String },

    /// Mark an available order as started (local status only)
    Start { id: String },

    /// Mark an in-route order as delivered (waits for the order service)
    Finish { id: String },

    /// Return an in-route order to the available list (local only)
    Cancel { id: String },

    /// Show one delivery: items, client, address and total with the delivery fee
    Details {
        /// Order id
        id: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the cached recent deliveries
    History {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Work with the kitchen board
    Kitchen {
        #[command(subcommand)]
        command: KitchenCommand,
    },
}

/// Kitchen board subcommands
#[derive(Debug, Subcommand)]
pub enum KitchenCommand {
    /// Write a fresh demo board
    Init {
        /// Overwrite an existing board file
        #[arg(long)]
        force: bool,
    },

    /// Print the board
    Show {
        /// Only orders whose number, table or items match
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Move an order to another list
    Move {
        id: String,

        /// Destination list (toPrepareList, inProgressList, readyList, deliveredList)
        #[arg(value_name = "LIST_ID")]
        list_id: String,

        /// Position in the destination list (default: end)
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Reorder an order within its list
    Reorder {
        #[arg(value_name = "LIST_ID")]
        list_id: String,
        from: usize,
        to: usize,
    },

    /// Push an order to the next status
    Advance { id: String },
}

/// Path of the log file the binary writes
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("orderboard")
        .join("logs")
        .join("orderboard.log")
}

/// Output format for board listings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
