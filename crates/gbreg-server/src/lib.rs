//! Live web server for the graph-break registry.
//!
//! Serves the listing, detail, and dashboard pages plus a small JSON API,
//! reading a fresh registry copy on every request.

mod server;

pub use server::{app, ServerConfig, ServerError, SiteServer};
