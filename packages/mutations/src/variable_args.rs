//! # Variable-Argument Shape Controller
//!
//! Manages a single row ending in variable selector fields, one per
//! currently-visible argument, plus a trailing "add" affordance. The visible
//! count and the chosen variable name per slot persist through the mutation
//! record.
//!
//! ## State
//!
//! Two counters: `currently_visible` is the desired count (set by restore or
//! by the add button) and `actually_visible` is what is physically present.
//! Reconciliation acts only on their difference, so an unchanged count is a
//! no-op against the host.
//!
//! The controller is shared (`Rc`) between the add-button callback and the
//! mutation hooks, and holds only a weak block handle: the block keeps the
//! controller alive through its fields and hooks, never the other way
//! around.

use crate::combinator::{append_mutation, ComposableMutation};
use blockkit_model::{Block, Field, WeakBlock};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Row hosting the selector fields and the trailing add button. The numeric
/// prefix keeps the name out of the space of valid user identifiers.
pub const HANDLER_ARGS_ROW: &str = "0_handler_args";

/// Field-name prefix for the per-argument selectors
pub const HANDLER_FIELD_PREFIX: &str = "HANDLER_";

/// Field name of the trailing add affordance
pub const ADD_ARG_FIELD: &str = "_HANDLER_ADD";

/// One potential argument slot, fixed at block-definition time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerArg {
    pub name: String,
}

impl HandlerArg {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

fn handler_field(arg: &HandlerArg) -> String {
    format!("{}{}", HANDLER_FIELD_PREFIX, arg.name)
}

struct VariableArgs {
    block: WeakBlock,
    args: Vec<HandlerArg>,
    currently_visible: Cell<usize>,
    actually_visible: Cell<usize>,
}

/// Attach the variable-args behavior to a block: creates the argument row
/// with its add affordance and registers persistence through the combinator.
pub fn init_variable_args_block(block: &Block, handler_args: Vec<HandlerArg>) {
    let controller = Rc::new(VariableArgs {
        block: block.downgrade(),
        args: handler_args,
        currently_visible: Cell::new(0),
        actually_visible: Cell::new(0),
    });

    block.append_dummy_input(HANDLER_ARGS_ROW);
    add_plus_button(&controller, block);

    let on_serialize = controller.clone();
    let on_deserialize = controller;
    append_mutation(
        block,
        ComposableMutation {
            serialize: Box::new(move |mut record| {
                let controller = &on_serialize;
                let visible = controller.currently_visible.get();
                record.set("numArgs", visible.to_string());

                if let Some(block) = controller.block.upgrade() {
                    for (index, arg) in controller.args.iter().take(visible).enumerate() {
                        let value = block.field_text(&handler_field(arg)).unwrap_or_default();
                        record.set(format!("arg{index}"), value);
                    }
                }
                record
            }),
            deserialize: Box::new(move |record| {
                let controller = &on_deserialize;

                // Read under lowercase casing; missing or malformed counts
                // clamp to zero. (Saved records use "numargs" even though the
                // write side emits "numArgs"; the asymmetry is kept for
                // compatibility with existing records.)
                let saved = record.get_int("numargs").unwrap_or(0).max(0) as usize;
                controller
                    .currently_visible
                    .set(saved.min(controller.args.len()));

                update_shape(controller);

                let Some(block) = controller.block.upgrade() else {
                    return;
                };
                for index in 0..controller.currently_visible.get() {
                    let field = handler_field(&controller.args[index]);
                    if let Some(value) = record.get(&format!("arg{index}")) {
                        if block.set_field_text(&field, value).is_err() {
                            // Shape mismatch against an older descriptor:
                            // skip the attribute rather than erroring
                            trace!(%field, "selector missing during restore, skipped");
                        }
                    }
                }
            }),
        },
    );
}

/// Drive the physical field row to match `currently_visible`
fn update_shape(controller: &Rc<VariableArgs>) {
    let current = controller.currently_visible.get();
    let actual = controller.actually_visible.get();
    if current == actual {
        return;
    }
    let Some(block) = controller.block.upgrade() else {
        return;
    };
    debug!(current, actual, "reconciling handler argument fields");

    {
        let mut inputs = block.inputs_mut();
        let Some(row) = inputs.iter_mut().find(|i| i.name() == HANDLER_ARGS_ROW) else {
            return;
        };

        if current > actual {
            // Insert missing selectors in ascending order, each just before
            // the trailing add button
            for offset in 0..(current - actual) {
                let arg = &controller.args[actual + offset];
                let position = row.field_count().saturating_sub(1);
                row.insert_field_at(
                    position,
                    Field::variable(arg.name.as_str()).named(handler_field(arg)),
                );
            }
        } else {
            // Remove excess selectors most-recently-added first
            for offset in 0..(actual - current) {
                let arg = &controller.args[actual - offset - 1];
                row.remove_field(&handler_field(arg));
            }
        }

        if current >= controller.args.len() {
            // No more room to grow
            row.remove_field(ADD_ARG_FIELD);
        }
    }

    if current < controller.args.len() && actual >= controller.args.len() {
        add_plus_button(controller, &block);
    }

    controller.actually_visible.set(current);
}

fn add_plus_button(controller: &Rc<VariableArgs>, block: &Block) {
    let handler = controller.clone();
    let field = Field::button("Add argument", move || {
        let next = (handler.currently_visible.get() + 1).min(handler.args.len());
        handler.currently_visible.set(next);
        update_shape(&handler);
    })
    .named(ADD_ARG_FIELD);

    let mut inputs = block.inputs_mut();
    if let Some(row) = inputs.iter_mut().find(|i| i.name() == HANDLER_ARGS_ROW) {
        row.append_field(field);
    }
}
