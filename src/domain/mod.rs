//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — policy documents, typed envelopes, reports and the
//!   settings file schema.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! `DumpReport` is the `--json` output of `dump`; keep field changes explicit.

pub mod models;
