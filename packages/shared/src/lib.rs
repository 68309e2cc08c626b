//! Shared utilities for the fumi direct-message chat application.
//!
//! This crate provides the pieces both the server and the client need:
//! logging setup and time/clock utilities.

pub mod logger;
pub mod time;
