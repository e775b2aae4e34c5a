//! `sf-domain` — shared types for the ScriptForge workspace.
//!
//! Holds the configuration model, the workspace-wide error type, and the
//! document/chunk types that flow between the memory client, the context
//! assembler, and the gateway pipeline. No I/O happens in this crate.

pub mod config;
pub mod document;
pub mod error;
