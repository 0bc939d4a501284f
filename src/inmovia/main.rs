use clap::Parser;
use directories::ProjectDirs;
use inmovia_store::commands::{self, config::ConfigAction, helpers::parse_filters, CmdResult};
use inmovia_store::config::StoreConfig;
use inmovia_store::db::Database;
use inmovia_store::error::{Result, StoreError};
use inmovia_store::store::fs_backend::FsBackend;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod args;
mod print;
use args::{Cli, Commands};
use print::{
    eprint_messages, print_collections, print_config, print_full_records, print_json,
    print_messages, print_records,
};

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

struct AppContext {
    db: Database<FsBackend>,
    data_dir: PathBuf,
    json: bool,
}

/// Returns `false` when the command completed but reported errors.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let ctx = init_context(&cli)?;

    let result = match cli.command {
        Commands::List {
            collection,
            filters,
        } => {
            let filters = parse_filters(&filters)?;
            let result = commands::list::run(&ctx.db, &collection, &filters)?;
            if ctx.json {
                print_json(&result.records)?;
            } else {
                print_records(&result.records);
            }
            result
        }
        Commands::Get { collection, id } => {
            let result = commands::get::run(&ctx.db, &collection, &id)?;
            show_records(&ctx, &result)?;
            result
        }
        Commands::Create { collection, json } => {
            let result = commands::create::run(&ctx.db, &collection, &json)?;
            show_records(&ctx, &result)?;
            result
        }
        Commands::Update {
            collection,
            id,
            json,
        } => {
            let result = commands::update::run(&ctx.db, &collection, &id, &json)?;
            show_records(&ctx, &result)?;
            result
        }
        Commands::Delete { collection, id } => commands::delete::run(&ctx.db, &collection, &id)?,
        Commands::Collections => {
            let result = commands::collections::run(&ctx.db)?;
            if ctx.json {
                print_json(&result.collections)?;
            } else {
                print_collections(&result.collections);
            }
            result
        }
        Commands::Doctor { collection } => commands::doctor::run(&ctx.db, collection.as_deref())?,
        Commands::Migrate { collection } => {
            commands::migrate::run(&ctx.db, collection.as_deref())?
        }
        Commands::Config { key, value } => {
            let action = match (key, value) {
                (None, _) => ConfigAction::ShowAll,
                (Some(key), None) => ConfigAction::ShowKey(key),
                (Some(key), Some(value)) => ConfigAction::Set(key, value),
            };
            let result = commands::config::run(&ctx.data_dir, action)?;
            if let Some(config) = &result.config {
                print_config(config);
            }
            result
        }
    };

    // With --json, stdout carries only the data.
    if ctx.json {
        eprint_messages(&result.messages);
    } else {
        print_messages(&result.messages);
    }

    Ok(!result.has_errors())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => ProjectDirs::from("com", "inmovia", "inmovia")
            .ok_or_else(|| StoreError::Config("Could not determine data dir".to_string()))?
            .data_dir()
            .to_path_buf(),
    };

    let config = StoreConfig::load(&data_dir)?;
    let db = Database::open(data_dir.clone(), &config);

    Ok(AppContext {
        db,
        data_dir,
        json: cli.json,
    })
}

fn show_records(ctx: &AppContext, result: &CmdResult) -> Result<()> {
    if ctx.json {
        for record in &result.records {
            print_json(record)?;
        }
    } else {
        print_full_records(&result.records)?;
    }
    Ok(())
}
