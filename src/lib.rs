//! # Daily Image
//!
//! Serves one image per calendar day from a fixed pool and rotates it at
//! local midnight. Which image a day gets is decided by hashing, so the
//! choice is reproducible: the same pool and the same date always give the
//! same image.
//!
//! # Architecture
//!
//! ```text
//! images/  ──scan──▶  ImagePool  ──select(date)──▶  image id
//!                                                      │
//!                              copy ◀──────────────────┘
//!                                │
//! assets/today_YYYY-MM-DD.jpg ◀──┘  ──publish──▶  HTTP handlers
//! ```
//!
//! A [`refresh::DailyRefresher`] runs that sequence once at startup and then
//! at every local midnight. HTTP handlers only read the published filename.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`mapper`] | Date → image selection (SHA-256 scoring) |
//! | [`scan`] | Builds the canonically sorted image pool from the source directory |
//! | [`refresh`] | Serialized refresh cycle and the midnight schedule loop |
//! | [`publish`] | Copy / remove files in the asset directory |
//! | [`naming`] | `today_YYYY-MM-DD.jpg` asset filename convention |
//! | [`clock`] | Time source and DST-safe next-midnight computation |
//! | [`server`] | axum routes: page, assets, favicon |
//! | [`page`] | Maud template for the page |
//! | [`config`] | Layered configuration: defaults, file, CLI / environment |
//! | [`logging`] | tracing subscriber setup (stdout + optional file) |
//! | [`output`] | CLI output formatting for `check` and `pick` |
//!
//! # Design Decisions
//!
//! ## Hash Scoring Over Day Counting
//!
//! A simple `days_since_epoch % pool_len` would walk through the pool in
//! order, which makes tomorrow's image predictable. Scoring every image with
//! `SHA-256(SHA-256(date) || name)` and taking the maximum gives an order
//! that looks random while staying deterministic. The cost is that adding or
//! removing an image may change the pick for any date.
//!
//! ## A Fresh Filename Per Day
//!
//! The asset is published as `today_YYYY-MM-DD.jpg` rather than a fixed
//! name, so browsers and proxies never keep showing yesterday's image from
//! cache.
//!
//! ## Readers Never Wait
//!
//! The refresh lock serializes writers only. The current filename is
//! published through a `tokio::sync::watch` channel after the file is in
//! place, so a page request never blocks on a refresh and never links to a
//! file that does not exist yet.

pub mod clock;
pub mod config;
pub mod logging;
pub mod mapper;
pub mod naming;
pub mod output;
pub mod page;
pub mod publish;
pub mod refresh;
pub mod scan;
pub mod server;

#[cfg(test)]
pub(crate) mod test_helpers;
