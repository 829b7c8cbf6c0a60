//! # Blocks
//!
//! A block is a visual node owning an ordered list of input rows and, once a
//! mutation feature has been attached, a combined serialize/deserialize hook
//! pair. `Block` is a cheaply clonable handle; all state lives behind a
//! single-owner `RefCell` because the whole engine is single-threaded and
//! event-driven.
//!
//! Hook bodies and button callbacks re-enter the block to change its shape,
//! so every dispatch path here clones the closure out of the cell and drops
//! the borrow before invoking it.

use crate::errors::ModelError;
use crate::field::Field;
use crate::input::{Input, InputKind};
use crate::record::MutationRecord;
use crate::workspace::Workspace;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

/// The block's current combined serialize/deserialize pair.
///
/// Owned exclusively by the block and replaced each time a feature attaches.
#[derive(Clone)]
pub struct MutationHooks {
    /// Produce the block's mutation record, invoking every attached
    /// serializer oldest-first
    pub serialize: Rc<dyn Fn() -> MutationRecord>,

    /// Restore from a mutation record, invoking every attached deserializer
    /// in registration order
    pub deserialize: Rc<dyn Fn(&MutationRecord)>,
}

struct BlockState {
    type_id: String,
    workspace: Workspace,
    inputs: Vec<Input>,
    rendered: bool,
    insertion_marker: bool,
    shadow: bool,
    render_requests: u32,
    hooks: Option<MutationHooks>,
}

/// Handle to a block instance
#[derive(Clone)]
pub struct Block {
    inner: Rc<RefCell<BlockState>>,
}

/// Non-owning block handle, used by controllers that are themselves kept
/// alive by the block (fields and hooks), so a strong back-reference would
/// leak the whole block.
#[derive(Clone)]
pub struct WeakBlock {
    inner: Weak<RefCell<BlockState>>,
}

impl WeakBlock {
    pub fn upgrade(&self) -> Option<Block> {
        self.inner.upgrade().map(|inner| Block { inner })
    }
}

impl Block {
    pub(crate) fn new(workspace: Workspace, type_id: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BlockState {
                type_id: type_id.into(),
                workspace,
                inputs: Vec::new(),
                rendered: false,
                insertion_marker: false,
                shadow: false,
                render_requests: 0,
                hooks: None,
            })),
        }
    }

    pub fn downgrade(&self) -> WeakBlock {
        WeakBlock {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same block instance
    pub fn same_block(&self, other: &Block) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn type_id(&self) -> String {
        self.inner.borrow().type_id.clone()
    }

    pub fn workspace(&self) -> Workspace {
        self.inner.borrow().workspace.clone()
    }

    // ---- draw lifecycle -------------------------------------------------

    /// Whether the host has drawn this block at least once
    pub fn is_rendered(&self) -> bool {
        self.inner.borrow().rendered
    }

    /// Host-side transition: the block has been drawn. Fires a workspace
    /// change notification, which is what drives deferred shape init.
    pub fn mark_rendered(&self) {
        let workspace = {
            let mut state = self.inner.borrow_mut();
            state.rendered = true;
            state.workspace.clone()
        };
        workspace.notify_change();
    }

    /// Ask the host to re-layout the block. Suppressed while undrawn; the
    /// deferred first-render pass finishes visibility work instead.
    pub fn request_render(&self) {
        let mut state = self.inner.borrow_mut();
        if state.rendered {
            state.render_requests += 1;
        } else {
            trace!(type_id = %state.type_id, "re-layout requested before first draw, suppressed");
        }
    }

    /// Number of re-layout requests recorded so far
    pub fn render_requests(&self) -> u32 {
        self.inner.borrow().render_requests
    }

    pub fn is_insertion_marker(&self) -> bool {
        self.inner.borrow().insertion_marker
    }

    pub fn set_insertion_marker(&self, marker: bool) {
        self.inner.borrow_mut().insertion_marker = marker;
    }

    /// Whether this block is default/shadow content
    pub fn is_shadow(&self) -> bool {
        self.inner.borrow().shadow
    }

    /// Mark as default content: replaceable, not counted as user content
    pub fn set_shadow(&self, shadow: bool) {
        self.inner.borrow_mut().shadow = shadow;
    }

    // ---- input rows -----------------------------------------------------

    /// Append a label-only row
    pub fn append_dummy_input(&self, name: impl Into<String>) {
        self.inner
            .borrow_mut()
            .inputs
            .push(Input::new(name, InputKind::Dummy));
    }

    /// Append a row ending in a connection socket
    pub fn append_value_input(&self, name: impl Into<String>) {
        self.inner
            .borrow_mut()
            .inputs
            .push(Input::new(name, InputKind::Value));
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.inner.borrow().inputs.iter().any(|i| i.name() == name)
    }

    /// Remove a named row
    pub fn remove_input(&self, name: &str) -> Result<(), ModelError> {
        let mut state = self.inner.borrow_mut();
        if let Some(pos) = state.inputs.iter().position(|i| i.name() == name) {
            state.inputs.remove(pos);
            Ok(())
        } else {
            Err(ModelError::UnknownInput(name.to_string()))
        }
    }

    /// Remove a named row, ignoring absence
    pub fn remove_input_quiet(&self, name: &str) {
        let mut state = self.inner.borrow_mut();
        if let Some(pos) = state.inputs.iter().position(|i| i.name() == name) {
            state.inputs.remove(pos);
        }
    }

    /// Ordered read access to the input rows
    pub fn inputs(&self) -> Ref<'_, [Input]> {
        Ref::map(self.inner.borrow(), |state| state.inputs.as_slice())
    }

    /// Ordered mutable access to the input rows.
    ///
    /// The borrow must be dropped before any handle method is called on this
    /// block again.
    pub fn inputs_mut(&self) -> RefMut<'_, Vec<Input>> {
        RefMut::map(self.inner.borrow_mut(), |state| &mut state.inputs)
    }

    /// Set a named row's visibility. Only legal once the block has been
    /// drawn.
    pub fn set_input_visible(&self, name: &str, visible: bool) -> Result<(), ModelError> {
        let mut state = self.inner.borrow_mut();
        if !state.rendered {
            return Err(ModelError::NotRendered);
        }
        let input = state
            .inputs
            .iter_mut()
            .find(|i| i.name() == name)
            .ok_or_else(|| ModelError::UnknownInput(name.to_string()))?;
        input.set_visible(visible);
        Ok(())
    }

    // ---- fields ---------------------------------------------------------

    /// Append a field to a named row
    pub fn append_field_to(&self, row: &str, field: Field) -> Result<(), ModelError> {
        let mut state = self.inner.borrow_mut();
        let input = state
            .inputs
            .iter_mut()
            .find(|i| i.name() == row)
            .ok_or_else(|| ModelError::UnknownInput(row.to_string()))?;
        input.append_field(field);
        Ok(())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.inner
            .borrow()
            .inputs
            .iter()
            .any(|i| i.field(name).is_some())
    }

    /// Displayed text of a named field, searching every row
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .inputs
            .iter()
            .find_map(|i| i.field(name).map(|f| f.text().to_string()))
    }

    /// Restore a named field's value
    pub fn set_field_text(&self, name: &str, value: &str) -> Result<(), ModelError> {
        let mut state = self.inner.borrow_mut();
        for input in &mut state.inputs {
            if let Some(field) = input.field_mut(name) {
                field.set_value(value);
                return Ok(());
            }
        }
        Err(ModelError::UnknownField(name.to_string()))
    }

    /// Activate a named button field, as the host does on user click.
    ///
    /// The handler is cloned out before invocation so it may mutate this
    /// block.
    pub fn click_field(&self, name: &str) -> Result<(), ModelError> {
        let handler = {
            let state = self.inner.borrow();
            let field = state
                .inputs
                .iter()
                .find_map(|i| i.field(name))
                .ok_or_else(|| ModelError::UnknownField(name.to_string()))?;
            field
                .on_click()
                .ok_or_else(|| ModelError::NotClickable(name.to_string()))?
        };
        handler();
        Ok(())
    }

    // ---- mutation hooks -------------------------------------------------

    /// The current combined hook pair, if any feature has attached
    pub fn hooks(&self) -> Option<MutationHooks> {
        self.inner.borrow().hooks.clone()
    }

    /// Replace the combined hook pair
    pub fn set_hooks(&self, hooks: MutationHooks) {
        self.inner.borrow_mut().hooks = Some(hooks);
    }

    /// Produce the block's mutation record by running the hook chain.
    /// Blocks with no attached features serialize to an empty record.
    pub fn serialize(&self) -> MutationRecord {
        match self.hooks() {
            Some(hooks) => (hooks.serialize)(),
            None => MutationRecord::new(),
        }
    }

    /// Restore dynamic shape from a mutation record by running the hook
    /// chain in registration order
    pub fn restore(&self, record: &MutationRecord) {
        if let Some(hooks) = self.hooks() {
            (hooks.deserialize)(record);
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(state) => write!(f, "Block({:?})", state.type_id),
            Err(_) => write!(f, "Block(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn block() -> Block {
        Workspace::new().new_block("test_block")
    }

    #[test]
    fn test_row_and_field_lookup() {
        let b = block();
        b.append_dummy_input("args");
        b.append_field_to("args", Field::variable("cb").named("HANDLER_cb"))
            .unwrap();

        assert!(b.has_input("args"));
        assert_eq!(b.field_text("HANDLER_cb"), Some("cb".to_string()));

        b.set_field_text("HANDLER_cb", "other").unwrap();
        assert_eq!(b.field_text("HANDLER_cb"), Some("other".to_string()));

        assert_eq!(
            b.set_field_text("missing", "x"),
            Err(ModelError::UnknownField("missing".to_string()))
        );
    }

    #[test]
    fn test_click_reenters_block() {
        let b = block();
        b.append_dummy_input("row");

        // Handler mutates the very block that dispatched it
        let handle = b.clone();
        b.append_field_to(
            "row",
            Field::button("Add", move || handle.append_dummy_input("added")).named("_ADD"),
        )
        .unwrap();

        b.click_field("_ADD").unwrap();
        assert!(b.has_input("added"));
    }

    #[test]
    fn test_visibility_gated_on_draw() {
        let b = block();
        b.append_value_input("OPT0");

        assert_eq!(
            b.set_input_visible("OPT0", false),
            Err(ModelError::NotRendered)
        );

        b.mark_rendered();
        b.set_input_visible("OPT0", false).unwrap();
        assert!(!b.inputs()[0].is_visible());
    }

    #[test]
    fn test_render_requests_suppressed_before_draw() {
        let b = block();
        b.request_render();
        assert_eq!(b.render_requests(), 0);

        b.mark_rendered();
        b.request_render();
        assert_eq!(b.render_requests(), 1);
    }

    #[test]
    fn test_mark_rendered_notifies_workspace() {
        let workspace = Workspace::new();
        let b = workspace.new_block("test_block");

        let fired = Rc::new(Cell::new(false));
        let seen = fired.clone();
        workspace.add_change_listener(move || seen.set(true));

        b.mark_rendered();
        assert!(fired.get());
    }

    #[test]
    fn test_serialize_without_features_is_empty() {
        let b = block();
        assert!(b.serialize().is_empty());
    }
}
