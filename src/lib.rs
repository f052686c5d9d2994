//! # Server Status Monitoring & Ranking Engine
//!
//! Keeps a directory of remote game servers honest: every registered server
//! is periodically probed through external status providers, classified as
//! online or offline against a staleness window, and ranked on hourly and
//! daily leaderboards rebuilt after each probe cycle.
//!
//! ## Module Organization
//!
//! - [`providers`] — clients for the two external status providers plus the
//!   primary/secondary fallback resolver that normalizes their answers.
//! - [`classify`] — pure online/offline classification of persisted state,
//!   including fake-address suppression for demo and seed records.
//! - [`icon`] — validated, content-hashed icon cache keyed by server id.
//! - [`dispatch`] — the sequential, rate-paced probe cycle driver.
//! - [`ranking`] — full leaderboard recomputation with atomic snapshot swap.
//! - [`storage`] — the persistence seam and its in-memory backend.
//! - [`handlers`] — the small HTTP surface (`GET /status`, `POST /status/cycle`).

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod icon;
pub mod models;
pub mod providers;
pub mod ranking;
pub mod storage;
pub mod utils;
