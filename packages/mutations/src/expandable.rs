//! # Expandable-Parameter Shape Controller
//!
//! Manages a set of optional input rows (value sockets, each possibly
//! preceded by a label row) that reveal and hide progressively through
//! add/remove affordance rows, with default placeholder content dropped into
//! freshly revealed sockets.
//!
//! ## Deferred first-render initialization
//!
//! The host cannot report or change input visibility until a block has been
//! drawn once, so construction registers a one-shot workspace change
//! listener. The first notification that finds the block drawn and the
//! workspace not mid-drag performs the real initial reconciliation and then
//! deregisters the listener. All visibility-affecting work is thereby pushed
//! past construction and deserialization time.
//!
//! ## State
//!
//! `visible_options` counts revealed parameters; `inputs_initialized` records
//! whether the optional rows were ever materialized on this instance. They
//! persist separately because a block can legitimately save with all rows
//! materialized but none visible (the user hit "remove"), and the host
//! expects the same row count back on restore.

use crate::combinator::{append_mutation, ComposableMutation};
use crate::shadow::shadow_block_for_type;
use blockkit_model::{Block, Field, WeakBlock};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Affordance row names. Numeric prefix keeps them out of the space of valid
/// user identifiers, so generated parameter rows can never collide.
pub const ADD_BUTTON_ROW: &str = "0_add_button";
pub const REMOVE_BUTTON_ROW: &str = "0_rem_button";

/// Row-name prefix marking a label row that belongs to an optional parameter
pub const OPTIONAL_LABEL_PREFIX: &str = "0_label_";

/// Row-name prefix marking an optional value row; rows named exactly after a
/// parameter are recognized too
pub const OPTIONAL_INPUT_PREFIX: &str = "0_opt_";

/// Record key for the count of currently revealed parameters
pub const EXPANDED_ATTRIBUTE: &str = "_expanded";

/// Record key for whether the optional rows were ever materialized
pub const INPUT_INIT_ATTRIBUTE: &str = "_input_init";

/// One optional parameter: name, declared type (selects the default
/// placeholder), and an optional explicit placeholder block type that wins
/// over the type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandableParam {
    pub name: String,
    pub ty: String,
    pub shadow_block_id: Option<String>,
}

impl ExpandableParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            shadow_block_id: None,
        }
    }

    pub fn with_shadow_block(mut self, type_id: impl Into<String>) -> Self {
        self.shadow_block_id = Some(type_id.into());
        self
    }
}

struct Expandable {
    block: WeakBlock,
    params: Vec<ExpandableParam>,
    /// Per-click change: 1 normally, the whole parameter count in toggle
    /// (all-or-nothing) mode
    button_delta: isize,
    add_inputs: Box<dyn Fn(&Block)>,

    visible_options: Cell<usize>,
    inputs_initialized: Cell<bool>,
    add_shown: Cell<bool>,
    rem_shown: Cell<bool>,
    listener: Cell<Option<blockkit_model::ListenerId>>,
}

impl Expandable {
    fn total_options(&self) -> usize {
        self.params.len()
    }

    fn add_delta(&self, delta: isize) -> usize {
        let total = self.total_options() as isize;
        (self.visible_options.get() as isize + delta).clamp(0, total) as usize
    }
}

/// Attach the expandable-parameter behavior to a block.
///
/// `add_inputs` materializes the optional rows (labels named with
/// [`OPTIONAL_LABEL_PREFIX`], value rows either prefixed with
/// [`OPTIONAL_INPUT_PREFIX`] or named exactly after their parameter). It is
/// invoked at most once per block instance, lazily: on first reveal, or
/// eagerly during restore when the saved record says the rows existed.
pub fn init_expandable_block(
    block: &Block,
    params: Vec<ExpandableParam>,
    toggle: bool,
    add_inputs: impl Fn(&Block) + 'static,
) {
    let button_delta = if toggle { params.len() as isize } else { 1 };
    let controller = Rc::new(Expandable {
        block: block.downgrade(),
        params,
        button_delta,
        add_inputs: Box::new(add_inputs),
        visible_options: Cell::new(0),
        inputs_initialized: Cell::new(false),
        add_shown: Cell::new(false),
        rem_shown: Cell::new(false),
        listener: Cell::new(None),
    });

    // Input visibility is only legal once the block has been drawn, so the
    // initial reconciliation waits for the first change notification that
    // finds the block drawn and idle, then the listener removes itself
    let workspace = block.workspace();
    let deferred = controller.clone();
    let listener = workspace.add_change_listener(move || on_first_render(&deferred));
    controller.listener.set(Some(listener));

    let on_serialize = controller.clone();
    let on_deserialize = controller;
    append_mutation(
        block,
        ComposableMutation {
            serialize: Box::new(move |mut record| {
                let controller = &on_serialize;
                record.set(
                    EXPANDED_ATTRIBUTE,
                    controller.visible_options.get().to_string(),
                );
                record.set(
                    INPUT_INIT_ATTRIBUTE,
                    controller.inputs_initialized.get().to_string(),
                );
                record
            }),
            deserialize: Box::new(move |record| {
                let controller = &on_deserialize;

                if record.get_bool(INPUT_INIT_ATTRIBUTE) == Some(true)
                    && !controller.inputs_initialized.get()
                {
                    init_optional_inputs(controller);
                }

                if let Some(saved) = record.get_int(EXPANDED_ATTRIBUTE) {
                    if controller.inputs_initialized.get() {
                        // Rows already exist; apply the saved count as an
                        // absolute target (visible_options is still zero on
                        // this path, so the delta equals the target)
                        controller
                            .visible_options
                            .set(controller.add_delta(saved as isize));
                    } else {
                        // Rows not built yet; run the full reconciliation
                        // with rendering skipped, the deferred first-render
                        // pass finishes visibility
                        update_shape(controller, saved as isize, true, false);
                    }
                }
                // Unparseable or missing count: state stays at defaults
            }),
        },
    );
}

fn on_first_render(controller: &Rc<Expandable>) {
    let Some(block) = controller.block.upgrade() else {
        return;
    };
    let workspace = block.workspace();
    if block.is_rendered() && !workspace.is_dragging() {
        debug!(
            visible = controller.visible_options.get(),
            "first render, finishing deferred shape init"
        );
        update_shape(controller, 0, false, true);
        update_buttons(controller);

        // Nothing left to defer once the block has shape; clean up
        if let Some(listener) = controller.listener.take() {
            workspace.remove_change_listener(listener);
        }
    }
}

/// Core reconciliation: clamp the new count, materialize rows if needed,
/// walk the input list syncing visibility and placeholder content, then
/// recompute affordances.
///
/// `skip_render` suppresses the host re-layout request (used while the block
/// is still initializing, so sockets don't draw before their placeholders
/// exist); `force` runs the walk even when the count is unchanged.
fn update_shape(controller: &Rc<Expandable>, delta: isize, skip_render: bool, force: bool) {
    let new_value = controller.add_delta(delta);
    if !force && !skip_render && new_value == controller.visible_options.get() {
        return;
    }
    controller.visible_options.set(new_value);

    let Some(block) = controller.block.upgrade() else {
        return;
    };

    if !controller.inputs_initialized.get() && controller.visible_options.get() > 0 {
        init_optional_inputs(controller);
        if !block.is_rendered() {
            // Visibility is finished by the deferred first-render pass
            return;
        }
    }

    let visible = controller.visible_options.get();
    let total = controller.total_options();
    let rendered = block.is_rendered();
    let insertion_marker = block.is_insertion_marker();
    let workspace = block.workspace();
    trace!(visible, total, rendered, "syncing optional input visibility");

    let mut opt_index = 0;
    {
        let mut inputs = block.inputs_mut();
        for input in inputs.iter_mut() {
            if input.name().starts_with(OPTIONAL_LABEL_PREFIX) {
                // A label shows once a parameter at or past its position is
                // revealed; when everything is shown, all labels show
                if rendered {
                    input.set_visible(opt_index < visible || visible == total);
                }
            } else if input.name().starts_with(OPTIONAL_INPUT_PREFIX)
                || controller.params.iter().any(|p| p.name == input.name())
            {
                let show = opt_index < visible;
                if rendered {
                    input.set_visible(show);
                }
                // Only rows that have an empty socket take a placeholder;
                // checking before construction avoids orphaned shadows
                let socket_free = input
                    .connection()
                    .map_or(false, |connection| !connection.is_connected());
                if show && socket_free && !insertion_marker {
                    // Freshly revealed and empty: drop in default content
                    let placeholder = controller.params.get(opt_index).and_then(|param| {
                        param
                            .shadow_block_id
                            .clone()
                            .or_else(|| shadow_block_for_type(&param.ty).map(String::from))
                    });
                    if let Some(type_id) = placeholder {
                        let shadow = workspace.new_block(&type_id);
                        shadow.set_shadow(true);
                        if let Err(error) = input.connect(shadow) {
                            trace!(%error, row = input.name(), "placeholder skipped");
                        }
                    }
                }
                opt_index += 1;
            }
        }
    }

    update_buttons(controller);
    if !skip_render {
        block.request_render();
    }
}

/// Recompute the affordance rows: "add" exists iff something is still
/// hidden, "remove" iff something is shown. When the remove row must newly
/// appear while add already exists, add is re-added after it so remove
/// renders first; that ordering is a visual contract.
fn update_buttons(controller: &Rc<Expandable>) {
    let Some(block) = controller.block.upgrade() else {
        return;
    };
    let visible = controller.visible_options.get();
    let show_add = visible != controller.total_options();
    let show_remove = visible != 0;

    if !show_add {
        controller.add_shown.set(false);
        block.remove_input_quiet(ADD_BUTTON_ROW);
    }
    if !show_remove {
        controller.rem_shown.set(false);
        block.remove_input_quiet(REMOVE_BUTTON_ROW);
    }

    if show_remove && !controller.rem_shown.get() {
        if controller.add_shown.get() {
            block.remove_input_quiet(ADD_BUTTON_ROW);
            add_minus_button(controller, &block);
            add_plus_button(controller, &block);
        } else {
            add_minus_button(controller, &block);
        }
    }

    if show_add && !controller.add_shown.get() {
        add_plus_button(controller, &block);
    }
}

fn add_plus_button(controller: &Rc<Expandable>, block: &Block) {
    controller.add_shown.set(true);
    add_button(
        controller,
        block,
        ADD_BUTTON_ROW,
        "Reveal optional arguments",
        controller.button_delta,
    );
}

fn add_minus_button(controller: &Rc<Expandable>, block: &Block) {
    controller.rem_shown.set(true);
    add_button(
        controller,
        block,
        REMOVE_BUTTON_ROW,
        "Hide optional arguments",
        -controller.button_delta,
    );
}

fn add_button(controller: &Rc<Expandable>, block: &Block, name: &str, alt: &str, delta: isize) {
    block.append_dummy_input(name);
    let handler = controller.clone();
    let field = Field::button(alt, move || update_shape(&handler, delta, false, false)).named(name);
    let mut inputs = block.inputs_mut();
    if let Some(row) = inputs.iter_mut().find(|i| i.name() == name) {
        row.append_field(field);
    }
}

fn init_optional_inputs(controller: &Rc<Expandable>) {
    let Some(block) = controller.block.upgrade() else {
        return;
    };
    controller.inputs_initialized.set(true);
    (controller.add_inputs)(&block);
    update_buttons(controller);
}
