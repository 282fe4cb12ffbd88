//! # Form Page
//!
//! Master-detail view model bound to a [`FormController`].
//!
//! ## State Machine
//! ```text
//!                  new / edit
//!   ┌──────────┐ ────────────► ┌──────────┐
//!   │ Browsing │               │ Editing  │ ── save fails ──┐
//!   │ list on  │ ◄──────────── │ list off │ ◄───────────────┘
//!   │ detail   │ save / cancel │ detail   │   (message shown)
//!   │   off    │               │   on     │
//!   └──────────┘               └──────────┘
//!     │    ▲
//!     │    └── activate(row): load item, stay Browsing
//!     └─────── delete: remove loaded item, repopulate
//! ```

use std::collections::{BTreeMap, BTreeSet};

use tracing::{error, warn};

use super::controller::{FieldDescriptor, FieldValue, FormController, FormData};
use crate::error::{FormError, FormResult};

/// Whether the detail pane is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Browsing,
    Editing,
}

impl FormMode {
    fn describe(self) -> &'static str {
        match self {
            FormMode::Browsing => "browsing",
            FormMode::Editing => "editing",
        }
    }
}

/// Enabled state of the list and the buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonStates {
    pub new: bool,
    pub edit: bool,
    pub delete: bool,
    pub save: bool,
    pub cancel: bool,
    pub list: bool,
}

/// Generic list/detail form.
pub struct FormPage<C: FormController> {
    controller: C,
    fields: Vec<FieldDescriptor<C>>,
    controls: BTreeMap<&'static str, FieldValue>,
    rows: Vec<C::Item>,
    item: Option<C::Item>,
    mode: FormMode,
    message: Option<String>,
}

/// Checks field declarations: names must be non-empty and unique.
fn check_fields<C: FormController>(fields: &[FieldDescriptor<C>]) -> FormResult<()> {
    let mut seen = BTreeSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(FormError::InvalidFields(format!(
                "field labelled '{}' has no name",
                field.label
            )));
        }
        if !seen.insert(field.name) {
            return Err(FormError::InvalidFields(format!(
                "field '{}' declared twice",
                field.name
            )));
        }
    }
    Ok(())
}

impl<C: FormController> FormPage<C> {
    /// Builds the page and loads the items.
    ///
    /// ## Errors
    /// `InvalidFields` when the controller's declarations are unusable,
    /// or whatever the controller returns while listing items.
    pub fn new(controller: C) -> FormResult<Self> {
        let fields = controller.fields();
        check_fields(&fields)?;

        let mut page = FormPage {
            controller,
            fields,
            controls: BTreeMap::new(),
            rows: Vec::new(),
            item: None,
            mode: FormMode::Browsing,
            message: None,
        };
        page.populate()?;
        Ok(page)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn fields(&self) -> &[FieldDescriptor<C>] {
        &self.fields
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Whether the detail pane accepts input.
    pub fn detail_enabled(&self) -> bool {
        self.mode == FormMode::Editing
    }

    pub fn has_list(&self) -> bool {
        !self.controller.single()
    }

    /// List rows as displayed.
    pub fn rows(&self) -> Vec<String> {
        self.rows.iter().map(|i| self.controller.display(i)).collect()
    }

    /// The item loaded in the detail pane.
    pub fn current_item(&self) -> Option<&C::Item> {
        self.item.as_ref()
    }

    pub fn control(&self, field: &str) -> Option<&FieldValue> {
        self.controls.get(field)
    }

    /// Message for the user after a failed save or delete.
    pub fn user_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn dismiss_message(&mut self) {
        self.message = None;
    }

    pub fn buttons(&self) -> ButtonStates {
        let editing = self.mode == FormMode::Editing;
        let single = self.controller.single();
        let (edit, delete) = match &self.item {
            Some(item) => (
                !editing && self.controller.can_edit_item(item),
                !editing && !single && self.controller.can_delete_item(item),
            ),
            None => (false, false),
        };

        ButtonStates {
            new: !editing && !single && self.controller.can_add_item(),
            edit,
            delete,
            save: editing,
            cancel: editing,
            list: !editing && !single,
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Reloads items and returns to Browsing with nothing selected (or the
    /// single item loaded).
    pub fn populate(&mut self) -> FormResult<()> {
        self.mode = FormMode::Browsing;
        if self.controller.single() {
            self.rows.clear();
            let item = self.controller.item()?;
            self.set_item(item);
        } else {
            self.rows = self.controller.items()?;
            self.set_item(None);
        }
        Ok(())
    }

    fn set_item(&mut self, item: Option<C::Item>) {
        self.controls = self
            .fields
            .iter()
            .map(|f| {
                let value = match &item {
                    Some(item) => (f.get)(&self.controller, item),
                    None => f.default.clone(),
                };
                (f.name, value)
            })
            .collect();
        self.item = item;
    }

    fn reject(&self, action: &str) -> FormError {
        FormError::invalid_state(action, self.mode.describe())
    }

    /// Loads the item at `row` into the detail pane.
    pub fn activate(&mut self, row: usize) -> FormResult<()> {
        if !self.buttons().list {
            return Err(self.reject("select an item"));
        }
        let item = self
            .rows
            .get(row)
            .cloned()
            .ok_or_else(|| FormError::invalid_state(format!("select row {row}"), "browsing"))?;
        self.set_item(Some(item));
        Ok(())
    }

    /// Starts editing a new item with default values.
    pub fn new_item(&mut self) -> FormResult<()> {
        if !self.buttons().new {
            return Err(self.reject("add an item"));
        }
        self.mode = FormMode::Editing;
        self.set_item(None);
        Ok(())
    }

    /// Starts editing the loaded item.
    pub fn edit(&mut self) -> FormResult<()> {
        if !self.buttons().edit {
            return Err(self.reject("edit"));
        }
        self.mode = FormMode::Editing;
        Ok(())
    }

    /// Changes a control value while editing.
    pub fn set_control(&mut self, field: &str, value: FieldValue) -> FormResult<()> {
        if self.mode != FormMode::Editing {
            return Err(self.reject("change a field"));
        }
        let slot = self
            .controls
            .get_mut(field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        *slot = value;
        Ok(())
    }

    /// Values of the persisted controls.
    pub fn collect(&self) -> FormData {
        let mut data = FormData::new();
        for field in self.fields.iter().filter(|f| f.persisted) {
            if let Some(value) = self.controls.get(field.name) {
                data.insert(field.name, value.clone());
            }
        }
        data
    }

    /// Saves the edited values through the controller.
    ///
    /// On failure the page stays in Editing and the message is kept for
    /// display; the error is returned as well.
    pub fn save(&mut self) -> FormResult<()> {
        if self.mode != FormMode::Editing {
            return Err(self.reject("save"));
        }

        let data = self.collect();
        let result = match &self.item {
            None => self.controller.new_item(&data).map(|_| ()),
            Some(item) => self.controller.update_item(item, &data).map(|_| ()),
        };

        if let Err(err) = result {
            self.fail("save", &err);
            return Err(err);
        }

        self.message = None;
        self.populate()
    }

    /// Discards edits and shows the loaded item again.
    pub fn cancel(&mut self) -> FormResult<()> {
        if self.mode != FormMode::Editing {
            return Err(self.reject("cancel"));
        }
        self.mode = FormMode::Browsing;
        let item = self.item.take();
        self.set_item(item);
        Ok(())
    }

    /// Deletes the loaded item.
    pub fn delete(&mut self) -> FormResult<()> {
        if !self.buttons().delete {
            return Err(self.reject("delete"));
        }
        let Some(item) = self.item.clone() else {
            return Err(self.reject("delete"));
        };

        if let Err(err) = self.controller.delete_item(&item) {
            self.fail("delete", &err);
            return Err(err);
        }

        self.message = None;
        self.populate()
    }

    fn fail(&mut self, action: &str, err: &FormError) {
        match err {
            FormError::Validation(_) => warn!(action, error = %err, "Form rejected input"),
            _ => error!(action, error = %err, "Form operation failed"),
        }
        self.message = Some(err.user_message());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: usize,
        name: String,
    }

    #[derive(Default)]
    struct TagController {
        tags: Vec<Tag>,
        next_id: usize,
        fail_storage: bool,
        single: bool,
    }

    impl TagController {
        fn with(names: &[&str]) -> Self {
            let mut c = TagController::default();
            for n in names {
                c.tags.push(Tag {
                    id: c.next_id,
                    name: n.to_string(),
                });
                c.next_id += 1;
            }
            c
        }
    }

    impl FormController for TagController {
        type Item = Tag;

        fn fields(&self) -> Vec<FieldDescriptor<Self>> {
            vec![
                FieldDescriptor::<Self>::new("name", "Name", FieldValue::text(""), |_, t| {
                    FieldValue::text(&t.name)
                }),
                FieldDescriptor::<Self>::new("length", "Length", FieldValue::Number(0), |_, t| {
                    FieldValue::Number(t.name.len() as i64)
                })
                .read_only(),
            ]
        }

        fn single(&self) -> bool {
            self.single
        }

        fn item(&self) -> FormResult<Option<Tag>> {
            Ok(self.tags.first().cloned())
        }

        fn items(&self) -> FormResult<Vec<Tag>> {
            Ok(self.tags.clone())
        }

        fn display(&self, item: &Tag) -> String {
            item.name.clone()
        }

        fn new_item(&mut self, data: &FormData) -> FormResult<Tag> {
            assert!(!data.contains("length"));
            let name = data.text("name").unwrap_or_default();
            if name.is_empty() {
                return Err(ValidationError::Required {
                    field: "name".to_string(),
                }
                .into());
            }
            if self.fail_storage {
                return Err(FormError::persistence("disk full"));
            }
            let tag = Tag {
                id: self.next_id,
                name: name.to_string(),
            };
            self.next_id += 1;
            self.tags.push(tag.clone());
            Ok(tag)
        }

        fn update_item(&mut self, item: &Tag, data: &FormData) -> FormResult<Tag> {
            if self.fail_storage {
                return Err(FormError::persistence("disk full"));
            }
            let tag = self
                .tags
                .iter_mut()
                .find(|t| t.id == item.id)
                .ok_or_else(|| FormError::persistence("gone"))?;
            tag.name = data.text("name").unwrap_or_default().to_string();
            Ok(tag.clone())
        }

        fn delete_item(&mut self, item: &Tag) -> FormResult<()> {
            self.tags.retain(|t| t.id != item.id);
            Ok(())
        }

        fn can_delete_item(&self, item: &Tag) -> bool {
            item.name != "locked"
        }
    }

    #[test]
    fn test_initial_state_is_browsing() {
        let page = FormPage::new(TagController::with(&["a", "b"])).unwrap();

        assert_eq!(page.mode(), FormMode::Browsing);
        assert_eq!(page.rows(), vec!["a", "b"]);
        assert!(page.current_item().is_none());
        assert_eq!(
            page.buttons(),
            ButtonStates {
                new: true,
                list: true,
                ..ButtonStates::default()
            }
        );
        assert_eq!(page.control("name"), Some(&FieldValue::text("")));
    }

    #[test]
    fn test_create_item() {
        let mut page = FormPage::new(TagController::default()).unwrap();

        page.new_item().unwrap();
        assert!(page.detail_enabled());
        assert!(!page.buttons().list);

        page.set_control("name", FieldValue::text("drinks")).unwrap();
        page.save().unwrap();

        assert_eq!(page.mode(), FormMode::Browsing);
        assert_eq!(page.rows(), vec!["drinks"]);
        assert!(page.current_item().is_none());
    }

    #[test]
    fn test_validation_failure_stays_editing() {
        let mut page = FormPage::new(TagController::default()).unwrap();
        page.new_item().unwrap();

        let err = page.save().unwrap_err();
        assert!(matches!(err, FormError::Validation(_)));
        assert_eq!(page.mode(), FormMode::Editing);
        assert_eq!(page.user_message(), Some("name is required"));
    }

    #[test]
    fn test_persistence_failure_shows_generic_message() {
        let mut controller = TagController::with(&["a"]);
        controller.fail_storage = true;
        let mut page = FormPage::new(controller).unwrap();

        page.activate(0).unwrap();
        page.edit().unwrap();
        page.set_control("name", FieldValue::text("b")).unwrap();

        assert!(matches!(page.save(), Err(FormError::Persistence(_))));
        assert_eq!(page.mode(), FormMode::Editing);
        assert_eq!(page.user_message(), Some("Could not save the changes"));
    }

    #[test]
    fn test_activate_edit_cancel() {
        let mut page = FormPage::new(TagController::with(&["coffee"])).unwrap();

        page.activate(0).unwrap();
        assert_eq!(page.mode(), FormMode::Browsing);
        assert_eq!(page.control("length"), Some(&FieldValue::Number(6)));
        assert!(page.buttons().edit);
        assert!(page.buttons().delete);

        page.edit().unwrap();
        page.set_control("name", FieldValue::text("tea")).unwrap();
        page.cancel().unwrap();

        assert_eq!(page.mode(), FormMode::Browsing);
        assert_eq!(page.control("name"), Some(&FieldValue::text("coffee")));
        assert_eq!(page.controller().tags[0].name, "coffee");
    }

    #[test]
    fn test_update_item() {
        let mut page = FormPage::new(TagController::with(&["coffee"])).unwrap();
        page.activate(0).unwrap();
        page.edit().unwrap();
        page.set_control("name", FieldValue::text("tea")).unwrap();
        page.save().unwrap();

        assert_eq!(page.rows(), vec!["tea"]);
    }

    #[test]
    fn test_delete() {
        let mut page = FormPage::new(TagController::with(&["a", "locked"])).unwrap();

        page.activate(1).unwrap();
        assert!(!page.buttons().delete);
        assert!(page.delete().is_err());

        page.activate(0).unwrap();
        page.delete().unwrap();
        assert_eq!(page.rows(), vec!["locked"]);
    }

    #[test]
    fn test_guards() {
        let mut page = FormPage::new(TagController::with(&["a"])).unwrap();

        assert!(page.edit().is_err());
        assert!(page.save().is_err());
        assert!(page.set_control("name", FieldValue::text("x")).is_err());
        assert!(page.activate(5).is_err());

        page.new_item().unwrap();
        assert!(page.activate(0).is_err());
        assert!(matches!(
            page.set_control("nope", FieldValue::Empty),
            Err(FormError::UnknownField(_))
        ));
    }

    #[test]
    fn test_single_item_form() {
        let mut controller = TagController::with(&["only"]);
        controller.single = true;
        let page = FormPage::new(controller).unwrap();

        assert!(!page.has_list());
        assert!(page.rows().is_empty());
        assert_eq!(page.control("name"), Some(&FieldValue::text("only")));
        let buttons = page.buttons();
        assert!(!buttons.new);
        assert!(!buttons.delete);
        assert!(buttons.edit);
    }

    struct DuplicateFields;

    impl FormController for DuplicateFields {
        type Item = ();

        fn fields(&self) -> Vec<FieldDescriptor<Self>> {
            let f = FieldDescriptor::<Self>::new("name", "Name", FieldValue::Empty, |_, _| FieldValue::Empty);
            vec![f.clone(), f]
        }

        fn display(&self, _: &()) -> String {
            String::new()
        }

        fn new_item(&mut self, _: &FormData) -> FormResult<()> {
            Ok(())
        }

        fn update_item(&mut self, _: &(), _: &FormData) -> FormResult<()> {
            Ok(())
        }

        fn delete_item(&mut self, _: &()) -> FormResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        assert!(matches!(
            FormPage::new(DuplicateFields),
            Err(FormError::InvalidFields(_))
        ));
    }
}
