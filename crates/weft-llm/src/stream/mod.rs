//! Wire stream framing and tool-call assembly
//!
//! Three framing strategies recover discrete records from a streamed
//! response body: event-record framing (SSE, handled by
//! [`eventsource_stream`] inside the providers), line-per-record framing
//! ([`NdjsonDecoder`]), and unbounded-array framing ([`JsonArrayDecoder`]).
//! The [`ToolCallAssembler`] turns fragmented tool-call deltas into whole
//! calls.

pub mod assembler;
pub mod json_array;
pub mod ndjson;

pub use assembler::ToolCallAssembler;
pub use json_array::JsonArrayDecoder;
pub use ndjson::NdjsonDecoder;
