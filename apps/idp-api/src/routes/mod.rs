//! HTTP routes owned by the binary.

pub mod auth;
