//! Project Sync - real-time synchronization core for project data.
//!
//! A stream session keeps a local copy of a project's frames, creatives and
//! details in step with the server's event stream, while an independent
//! health monitor classifies network quality for display.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
