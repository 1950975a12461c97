//! Conversation adapters and request builders
//!
//! One module per backend family, each mapping the canonical message list
//! plus [`crate::types::GenerationOptions`] into that family's wire request.
//! Family rules live here; the serde structs they populate live in
//! [`crate::protocol`].

pub mod anthropic;
pub mod google;
pub mod ollama;
pub mod openai;
