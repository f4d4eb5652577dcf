//! # Puzzlehall - Sequential Puzzle Hall Engine
//!
//! Puzzlehall is the progress engine behind a small puzzle game: a set of
//! "halls", each a linear sequence of lockable "rooms". A player types a key
//! to unlock a room, may reveal hints one at a time, and progress survives
//! restarts.
//!
//! ## Features
//!
//! - **Sequential unlocks**: room *i* is reachable only once room *i-1* is unlocked.
//! - **Forgiving keys**: matching ignores surrounding whitespace and case; retries are unlimited.
//! - **Progressive hints**: hints are revealed in order and never exceed the room's total.
//! - **Relock**: any room (and everything after it) can be relocked, clearing its hints.
//! - **Durable progress**: saved atomically after every change, surfaced as an error if the save fails.
//! - **Pluggable content**: hall documents come from a directory or over HTTP.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use puzzlehall::config::Config;
//! use puzzlehall::house::PuzzleHouse;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut house = PuzzleHouse::from_config(&config).await?;
//!
//!     house.select_hall("erik").await?;
//!     for (room, state) in house.accessible_rooms()? {
//!         println!("{}: {:?}", room.title, state);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`house`] - Caller-facing surface combining progress and hall content
//! - [`progress`] - Progress store and durable slots
//! - [`session`] - Hall cache and access-state derivation
//! - [`content`] - Hall and room types, content sources
//! - [`config`] - Configuration management
//! - [`errors`] - Load, storage, and validation errors
//! - [`validation`] - Hall id and content checks, key normalization
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Puzzle House   │ ← Player intents
//! └─────────────────┘
//!      │        │
//! ┌─────────┐ ┌──────────┐
//! │ Progress│ │   Hall   │
//! │  Store  │ │ Session  │
//! └─────────┘ └──────────┘
//!      │        │
//!  progress   hall content
//!   slot       source
//! ```

pub mod config;
pub mod content;
pub mod errors;
pub mod house;
pub mod logutil;
pub mod progress;
pub mod session;
pub mod validation;
