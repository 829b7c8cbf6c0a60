//! # Fields
//!
//! Fields are the leaf slots of an input row: static labels, variable
//! selectors, and clickable affordance buttons. Button callbacks are stored
//! as `Rc<dyn Fn()>` so they can be cloned out of the block before being
//! invoked (callbacks re-enter the block to change its shape).

use std::fmt;
use std::rc::Rc;

/// A single field on an input row
#[derive(Clone)]
pub struct Field {
    name: Option<String>,
    kind: FieldKind,
}

#[derive(Clone)]
pub enum FieldKind {
    /// Static text
    Label(String),

    /// Variable selector showing a variable name
    Variable { text: String },

    /// Clickable affordance with an accessibility label
    Button {
        alt: String,
        on_click: Rc<dyn Fn()>,
    },
}

impl Field {
    /// Create an unnamed label field
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            name: None,
            kind: FieldKind::Label(text.into()),
        }
    }

    /// Create a variable selector initially displaying `var_name`
    pub fn variable(var_name: impl Into<String>) -> Self {
        Self {
            name: None,
            kind: FieldKind::Variable {
                text: var_name.into(),
            },
        }
    }

    /// Create a button field with a click handler
    pub fn button(alt: impl Into<String>, on_click: impl Fn() + 'static) -> Self {
        Self {
            name: None,
            kind: FieldKind::Button {
                alt: alt.into(),
                on_click: Rc::new(on_click),
            },
        }
    }

    /// Assign a name so the field can be addressed later
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The currently displayed text
    pub fn text(&self) -> &str {
        match &self.kind {
            FieldKind::Label(text) => text,
            FieldKind::Variable { text } => text,
            FieldKind::Button { alt, .. } => alt,
        }
    }

    /// Restore a displayed value. Only meaningful for variable selectors;
    /// other kinds ignore it.
    pub fn set_value(&mut self, value: &str) {
        if let FieldKind::Variable { text } = &mut self.kind {
            *text = value.to_string();
        }
    }

    /// The click handler, if this is a button field
    pub fn on_click(&self) -> Option<Rc<dyn Fn()>> {
        match &self.kind {
            FieldKind::Button { on_click, .. } => Some(on_click.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            FieldKind::Label(text) => format!("Label({:?})", text),
            FieldKind::Variable { text } => format!("Variable({:?})", text),
            FieldKind::Button { alt, .. } => format!("Button({:?})", alt),
        };
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_variable_field_value_restore() {
        let mut field = Field::variable("handler").named("HANDLER_x");
        assert_eq!(field.text(), "handler");

        field.set_value("myVar");
        assert_eq!(field.text(), "myVar");
    }

    #[test]
    fn test_button_click_handler() {
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        let field = Field::button("Add argument", move || counter.set(counter.get() + 1));

        let handler = field.on_click().unwrap();
        handler();
        handler();
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn test_label_ignores_set_value() {
        let mut field = Field::label("with");
        field.set_value("other");
        assert_eq!(field.text(), "with");
    }
}
