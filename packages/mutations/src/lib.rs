//! # Blockkit Mutations
//!
//! Composable mutation and dynamic-shape engine for visual programming
//! blocks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ combinator: chain serialize/deserialize     │
//! │ hooks from independent features onto one    │
//! │ block without clobbering each other         │
//! └─────────────────────────────────────────────┘
//!                     ↑
//! ┌──────────────────────┬──────────────────────┐
//! │ variable_args:       │ expandable:          │
//! │ growable selector    │ optional input rows  │
//! │ row + add affordance │ + add/remove rows,   │
//! │                      │ deferred first-render│
//! │                      │ init, placeholders   │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! A block-construction routine calls one `init_*` function per feature it
//! wants on the block; each registers its persistence behavior through
//! [`append_mutation`], chained after whatever was attached before. The host
//! invokes the combined hooks at save and load time through
//! `Block::serialize` / `Block::restore`.
//!
//! ## Core principles
//!
//! 1. **Shape follows state**: controllers reconcile the physical input list
//!    against a desired count, never mutate it ad hoc
//! 2. **Malformed input clamps, never errors**: out-of-range counts are
//!    clamped, missing fields skipped
//! 3. **Nothing visual before first draw**: visibility changes and re-layout
//!    are deferred until the host reports the block drawn

mod combinator;
mod expandable;
mod shadow;
mod variable_args;

pub use combinator::{append_mutation, ComposableMutation};
pub use expandable::{
    init_expandable_block, ExpandableParam, ADD_BUTTON_ROW, EXPANDED_ATTRIBUTE,
    INPUT_INIT_ATTRIBUTE, OPTIONAL_INPUT_PREFIX, OPTIONAL_LABEL_PREFIX, REMOVE_BUTTON_ROW,
};
pub use shadow::shadow_block_for_type;
pub use variable_args::{
    init_variable_args_block, HandlerArg, ADD_ARG_FIELD, HANDLER_ARGS_ROW, HANDLER_FIELD_PREFIX,
};

// Re-export the host-boundary types embedders interact with
pub use blockkit_model::{Block, MutationRecord, Workspace};
