// src/dev/mod.rs
// Development helpers shared by binaries and tests.
pub mod generator;
