// src/commands/mod.rs
//! Command handlers for the mirrorpak CLI

mod convert;
mod mirror;

// Re-export all command handlers
pub use convert::cmd_convert;
pub use mirror::cmd_mirror;
