//! `sf-context` — document splitting and context assembly.
//!
//! Two halves of the same policy. At ingest time [`split_text`] slices a
//! document into overlapping chunks tagged with their position. At
//! retrieval time the assembler turns scored chunk hits back into a
//! bounded, ordered, per-document context: [`filter_by_threshold`],
//! [`group_into_context`], [`serialize_context`].
//!
//! Everything here is pure and deterministic — no I/O, no clocks. Which
//! prior scripts genuinely influence a generated script is decided in
//! this crate, so the ordering and dedup rules are load-bearing.

pub mod assemble;
pub mod split;

pub use assemble::{filter_by_threshold, group_into_context, serialize_context, ContextBundle, ContextEntry};
pub use split::split_text;
