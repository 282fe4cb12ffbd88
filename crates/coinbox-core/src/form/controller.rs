//! # Form Controllers
//!
//! A form controller mediates between a generic [`FormPage`] and one
//! entity type: it declares the fields, lists the items and performs
//! create / update / delete.
//!
//! ```text
//!   FormPage<C>                         C: FormController
//!   ┌───────────────┐   items()        ┌──────────────────┐
//!   │ list  │detail │ ◄─────────────── │ fields()         │
//!   │       │ name  │   field.get()    │ items() / item() │
//!   │       │ ...   │ ◄─────────────── │ new_item()       │──► storage
//!   │       │[Save] │ ───────────────► │ update_item()    │
//!   └───────────────┘   FormData       │ delete_item()    │
//!                                      └──────────────────┘
//! ```
//!
//! [`FormPage`]: super::page::FormPage

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::FormResult;

// =============================================================================
// Field Values
// =============================================================================

/// The value held by one form control.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Flag(bool),
    Number(i64),
    /// Multi-select list: every option and the checked ones.
    Selection {
        options: Vec<String>,
        selected: Vec<String>,
    },
    /// Structured value edited through a dedicated dialog.
    Record(Value),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Checked entries of a selection; empty for any other value.
    pub fn selected(&self) -> &[String] {
        match self {
            FieldValue::Selection { selected, .. } => selected,
            _ => &[],
        }
    }

    pub fn as_record(&self) -> Option<&Value> {
        match self {
            FieldValue::Record(v) => Some(v),
            _ => None,
        }
    }
}

/// Values collected from the persisted controls on Save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    values: BTreeMap<String, FieldValue>,
}

impl FormData {
    pub fn new() -> Self {
        FormData::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }

    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn selected(&self, field: &str) -> &[String] {
        self.get(field).map(FieldValue::selected).unwrap_or_default()
    }

    pub fn record(&self, field: &str) -> Option<&Value> {
        self.get(field).and_then(FieldValue::as_record)
    }
}

// =============================================================================
// Field Descriptors
// =============================================================================

/// Declaration of one form field.
///
/// `persisted == false` marks display-only fields (e.g. an info dump):
/// they are shown but never sent back to the controller.
pub struct FieldDescriptor<C: FormController> {
    pub name: &'static str,
    pub label: &'static str,
    pub default: FieldValue,
    pub get: fn(&C, &C::Item) -> FieldValue,
    pub persisted: bool,
}

impl<C: FormController> FieldDescriptor<C> {
    pub fn new(
        name: &'static str,
        label: &'static str,
        default: FieldValue,
        get: fn(&C, &C::Item) -> FieldValue,
    ) -> Self {
        FieldDescriptor {
            name,
            label,
            default,
            get,
            persisted: true,
        }
    }

    /// Marks the field as display-only.
    pub fn read_only(mut self) -> Self {
        self.persisted = false;
        self
    }
}

impl<C: FormController> Clone for FieldDescriptor<C> {
    fn clone(&self) -> Self {
        FieldDescriptor {
            name: self.name,
            label: self.label,
            default: self.default.clone(),
            get: self.get,
            persisted: self.persisted,
        }
    }
}

impl<C: FormController> fmt::Debug for FieldDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("default", &self.default)
            .field("persisted", &self.persisted)
            .finish()
    }
}

// =============================================================================
// Controller Trait
// =============================================================================

/// CRUD mediator between a [`FormPage`](super::page::FormPage) and an
/// entity type.
pub trait FormController: Sized {
    type Item: Clone;

    /// Field declarations, in display order.
    fn fields(&self) -> Vec<FieldDescriptor<Self>>;

    /// Single-item forms have no list and no New/Delete.
    fn single(&self) -> bool {
        false
    }

    /// The item of a single-item form.
    fn item(&self) -> FormResult<Option<Self::Item>> {
        Ok(None)
    }

    /// All items of a list form.
    fn items(&self) -> FormResult<Vec<Self::Item>> {
        Ok(Vec::new())
    }

    /// Text shown for an item in the list.
    fn display(&self, item: &Self::Item) -> String;

    fn new_item(&mut self, data: &FormData) -> FormResult<Self::Item>;

    fn update_item(&mut self, item: &Self::Item, data: &FormData) -> FormResult<Self::Item>;

    fn delete_item(&mut self, item: &Self::Item) -> FormResult<()>;

    fn can_add_item(&self) -> bool {
        true
    }

    fn can_edit_item(&self, _item: &Self::Item) -> bool {
        true
    }

    fn can_delete_item(&self, _item: &Self::Item) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_data_accessors() {
        let data = FormData::new()
            .with("name", FieldValue::text("kitchen"))
            .with(
                "functions",
                FieldValue::Selection {
                    options: vec!["receipt".into(), "kitchen".into()],
                    selected: vec!["receipt".into()],
                },
            );

        assert_eq!(data.text("name"), Some("kitchen"));
        assert_eq!(data.selected("functions"), ["receipt".to_string()]);
        assert!(data.selected("missing").is_empty());
        assert!(data.record("name").is_none());
    }
}
