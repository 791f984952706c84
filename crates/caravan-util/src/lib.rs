#![forbid(unsafe_code)]
//! Hashing, filesystem, and HTTP helpers shared by the Caravan crates.

pub mod artifact;
pub mod download;
pub mod error;
pub mod fs;
pub mod hash;
