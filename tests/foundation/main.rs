//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, ValueType, Error, and both annotation tiers.

mod annotations;
mod errors;
mod values;
