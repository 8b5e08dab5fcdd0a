//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `dump.rs` — agent policy export: fetch scope, package filter, dumper.
//! - `fleet.rs` — Fleet API client and the `PolicySource` seam.
//! - `storage.rs` — `ObjectWriter` seam and the JSON file writer.
//! - `settings.rs` — connection settings file + flag/env merge.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod dump;
pub mod fleet;
pub mod output;
pub mod settings;
pub mod storage;
