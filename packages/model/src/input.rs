//! # Input Rows
//!
//! An input row is a named structural unit of a block: an ordered run of
//! fields plus, for value rows, a connection socket accepting another block's
//! output. Rows are mutated in place by the shape controllers; the block owns
//! the ordered row list.

use crate::block::Block;
use crate::errors::ModelError;
use crate::field::Field;

/// The structural kind of an input row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Label-only row, no socket
    Dummy,

    /// Row ending in a connection socket
    Value,
}

/// Connection socket on a value row
#[derive(Debug, Clone, Default)]
pub struct Connection {
    target: Option<Block>,
}

impl Connection {
    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&Block> {
        self.target.as_ref()
    }
}

/// A named input row on a block
#[derive(Debug, Clone)]
pub struct Input {
    name: String,
    kind: InputKind,
    fields: Vec<Field>,
    visible: bool,
    connection: Option<Connection>,
}

impl Input {
    pub(crate) fn new(name: impl Into<String>, kind: InputKind) -> Self {
        let connection = match kind {
            InputKind::Dummy => None,
            InputKind::Value => Some(Connection::default()),
        };
        Self {
            name: name.into(),
            kind,
            fields: Vec::new(),
            visible: true,
            connection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Append a field at the end of the row
    pub fn append_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Insert a field at `index`, clamped to the end of the row
    pub fn insert_field_at(&mut self, index: usize, field: Field) {
        let index = index.min(self.fields.len());
        self.fields.insert(index, field);
    }

    /// Remove a named field. Returns whether it was present.
    pub fn remove_field(&mut self, name: &str) -> bool {
        if let Some(pos) = self.fields.iter().position(|f| f.name() == Some(name)) {
            self.fields.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == Some(name))
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name() == Some(name))
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set row visibility. Callers must only do this once the owning block
    /// has been drawn; the shape controllers guard every call site.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the row's socket has something connected. Dummy rows never do.
    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .map_or(false, Connection::is_connected)
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Connect another block's output to this row's socket
    pub fn connect(&mut self, target: Block) -> Result<(), ModelError> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| ModelError::NoConnection(self.name.clone()))?;
        if connection.target.is_some() {
            return Err(ModelError::ConnectionOccupied(self.name.clone()));
        }
        connection.target = Some(target);
        Ok(())
    }
}
