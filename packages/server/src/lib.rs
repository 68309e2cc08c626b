//! Direct-message chat server library.
//!
//! This library implements the realtime core of the fumi chat application:
//! presence tracking (who is online, observed through a process-wide
//! connection registry), point-to-point message routing with
//! persist-then-notify semantics, and best-effort typing signal relay.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
