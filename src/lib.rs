//! Library crate for netdiag-rs exposing reusable modules.
pub mod buildinfo;
pub mod config;
pub mod instrument;
pub mod introspect;
pub mod prober;
pub mod server;
pub mod types;
