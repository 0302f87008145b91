//! Integration tests for Layer 1: Metadata
//!
//! Tests for entity types, keys, relationships, members, and the runtime
//! tier of a finalized model.

mod members;
mod relationships;
mod runtime;
