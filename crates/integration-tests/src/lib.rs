//! Integration test crate; all content lives in `tests/`
