//! Personal travel-log service.
//!
//! Sojourn records a chronological sequence of *stays* — visits to a location
//! with a start instant, an optional end instant, a trip group, a country, and
//! a timezone offset — and exposes a small HTTP API for asking "where am I
//! now / next / previously", "where was I at time T", and "where was I during
//! [T1, T2)". Adding a new trip automatically closes any still-open earlier
//! stay and inherits group/country/timezone from the stay before it.
//!
//! # Architecture
//!
//! - **Storage**: SQLite, one `stays` table, timestamps as RFC 3339 text
//! - **Core**: [`history::timeline`] — pure interval logic over the full stay
//!   list, re-fetched from the store per request
//! - **Transport**: axum HTTP with a shared-key check on write endpoints
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, and migrations
//! - [`history`] — Core domain: stay records, the store trait, and the timeline engine
//! - [`api`] — HTTP routes and request/response mapping
//! - [`server`] — Server startup and shutdown

pub mod api;
pub mod config;
pub mod db;
pub mod history;
pub mod server;
