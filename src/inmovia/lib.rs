//! # Inmovia Store Architecture
//!
//! The Inmovia Office back office keeps all of its business data in flat JSON
//! files: one file per collection, each a JSON array of records. This crate is
//! that persistence layer plus a small operator CLI. The CLI is one client of
//! the library, not the other way round.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs, print.rs)                           │
//! │  - Parses arguments, formats output, owns stdout/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One `run` per command, returns `CmdResult`               │
//! │  - No terminal assumptions                                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Database + Entities (db.rs, entities/)                     │
//! │  - Typed stores per collection, lookup helpers              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - RecordStore engine over a StorageBackend                 │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Reads always reflect the file as it is now; nothing is cached.
//! - A mutation is one read-modify-write cycle that never overlaps another
//!   on the same collection, in this process or in another one.
//! - A file that exists but does not parse is an error, never an empty
//!   collection. The store will not overwrite data it could not read.
//! - Writes are atomic: a crash leaves either the old file or the new one.
//! - "Not found" is `None` or `false`, not an error.
//!
//! ## Testing Strategy
//!
//! 1. **Engine and entities**: unit tests against `MemBackend`, which can
//!    inject read and write failures and simulate writers that skip the lock.
//! 2. **Filesystem backend**: integration tests in `tests/` on a temp dir.
//! 3. **CLI**: `assert_cmd` runs against a `--data-dir` temp dir.
//!
//! ## Module Overview
//!
//! - [`store`]: backends and the `RecordStore` engine
//! - [`db`]: the `Database` handle and its gate registry
//! - [`entities`]: typed office entities and their helpers
//! - [`commands`]: business logic behind each CLI command
//! - [`model`]: `Record`, the `Entity` trait, timestamp format
//! - [`merge`]: patch merge rules
//! - [`id`]: id generation strategies
//! - [`config`]: `config.json` handling
//! - [`error`]: error taxonomy

pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod id;
pub mod merge;
pub mod model;
pub mod store;
