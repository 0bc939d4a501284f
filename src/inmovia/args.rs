use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inmovia", bin_name = "inmovia", version)]
#[command(about = "Inspect and maintain the Inmovia Office data store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to $INMOVIA_DATA_DIR, then the OS data dir)
    #[arg(short, long, global = true, env = "INMOVIA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print records as raw JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the records of a collection
    #[command(alias = "ls")]
    List {
        collection: String,

        /// Only records whose field equals the value (repeatable)
        #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
    },

    /// Show one record
    #[command(alias = "v")]
    Get { collection: String, id: String },

    /// Create a record from a JSON object
    #[command(alias = "n")]
    Create {
        collection: String,
        #[arg(id = "payload", value_name = "JSON")]
        json: String,
    },

    /// Merge a JSON object into a record
    #[command(alias = "e")]
    Update {
        collection: String,
        id: String,
        #[arg(id = "payload", value_name = "JSON")]
        json: String,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete { collection: String, id: String },

    /// List the collections present in the data directory
    Collections,

    /// Check and repair collections
    Doctor {
        /// Only this collection
        collection: Option<String>,
    },

    /// Persist current entity defaults into stored records
    Migrate {
        /// Only this collection
        collection: Option<String>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (id-strategy, lock-timeout-ms, io-timeout-ms, pretty)
        key: Option<String>,

        /// Value to set
        value: Option<String>,
    },
}
