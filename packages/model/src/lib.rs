//! # Blockkit Model
//!
//! Host-boundary object model for the blockkit mutation engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: blocks, rows, fields, workspace      │
//! │  - Ordered input-row list per block         │
//! │  - Mutation records (attribute maps)        │
//! │  - Change notifications + draw lifecycle    │
//! └─────────────────────────────────────────────┘
//!                     ↑
//! ┌─────────────────────────────────────────────┐
//! │ mutations: combinator + shape controllers   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! This crate is the headless stand-in for the host block editor: it models
//! exactly the capabilities the shape controllers consume (row/field surgery,
//! connection sockets, the drawn/undrawn lifecycle, change notifications) and
//! nothing else. A real editor embeds or wraps this model; tests drive it
//! directly.
//!
//! Everything is single-threaded and event-driven. Handles are `Rc`-based
//! and state lives behind `RefCell`/`Cell`; there is no locking anywhere.

mod block;
mod errors;
mod field;
mod input;
mod record;
mod workspace;

pub use block::{Block, MutationHooks, WeakBlock};
pub use errors::ModelError;
pub use field::{Field, FieldKind};
pub use input::{Connection, Input, InputKind};
pub use record::MutationRecord;
pub use workspace::{ListenerId, Workspace};
