//! # Unit Tests
//!
//! Tests grouped by the stage they cover, mirroring the library's module layout.

/// Configuration store lookups and scalar rendering.
pub mod config;






/// Template parsing, serialization and generation.
pub mod template;
