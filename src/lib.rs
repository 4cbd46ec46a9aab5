//! # taskboard
//!
//! Board state synchronization engine for an AI-powered kanban task board.
//!
//! This library provides:
//! - An in-memory, strictly-ordered board of columns and tasks
//! - Drag-gesture reordering with dense, gap-free positions
//! - Best-effort reconciliation against a remote persistence service, with
//!   transparent degradation to a non-persistent demo mode
//! - A natural-language command channel that synthesizes new tasks
//!
//! ## Architecture
//!
//! ```text
//!   gesture / command
//!          │
//!          ▼
//!   ┌──────────────┐   plan    ┌─────────────────┐
//!   │  BoardStore  │◄──────────│  reorder engine │
//!   │ (in-memory,  │           └─────────────────┘
//!   │ single writer)│
//!   └──────┬───────┘
//!          │ best-effort, result-ignored
//!          ▼
//!   ┌──────────────┐
//!   │ persistence  │  (remote REST store; failure ⇒ demo mode)
//!   │   gateway    │
//!   └──────────────┘
//! ```
//!
//! State transitions are synchronous and optimistic: the UI-visible
//! collections are updated before any network call resolves, and a remote
//! failure never rolls them back.
//!
//! ## Modules
//! - `board`: state store, reorder engine, fallback board data
//! - `persist`: persistence gateway contract and REST implementation
//! - `command`: natural-language command bridge
//! - `llm`: text-generation client
//! - `api`: HTTP surface and dashboard auth

pub mod api;
pub mod board;
pub mod command;
pub mod config;
pub mod llm;
pub mod model;
pub mod persist;

pub use config::Config;
