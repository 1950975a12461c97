//! Wire format types for each backend family
//!
//! Pure serde structs mirroring what actually goes over the network; all
//! conversion logic lives in [`crate::convert`].

pub mod anthropic;
pub mod google;
pub mod ollama;
pub mod openai;
