//! No library surface of its own; this crate exists to host the
//! end-to-end integration tests under `tests/` that exercise every layer
//! of the fabric together.
