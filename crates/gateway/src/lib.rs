//! `sf-gateway` — the ScriptForge composition root.
//!
//! Wires the quota tracker and context assembler to their external
//! collaborators (similarity search, text generation, text extraction,
//! message delivery) behind an axum HTTP surface: the messaging webhook
//! plus a small `/v1` API for direct script operations and user
//! administration.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod delivery;
pub mod extract;
pub mod prompts;
pub mod runtime;
pub mod state;
