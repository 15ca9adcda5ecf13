//! The dialog creating a list, or editing an existing one

use std::sync::Mutex;

use super::{Context, Outcome};
use crate::bus::AppEvent;
use crate::client::fetch;
use crate::error::Error;
use crate::ids::ListId;
use crate::list::{List, Visibility, MAX_LIST_NAME_LENGTH, MAX_TAGS};
use crate::operations::lists::{self, ListInput};
use crate::view_state::{any_error, lock, FieldState, TagSelection};

/// Names must be longer than this
const MIN_LIST_NAME_LENGTH: usize = 3;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListValidation {
    pub name: FieldState,
    pub visibility: FieldState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListForm {
    pub is_open: bool,
    /// The list being edited, `None` when creating one
    pub edit_id: Option<ListId>,
    pub name: String,
    pub description: String,
    pub visibility: Option<Visibility>,
    pub tags: TagSelection,
    pub validation: ListValidation,
}

impl Default for ListForm {
    fn default() -> Self {
        Self {
            is_open: false,
            edit_id: None,
            name: String::new(),
            description: String::new(),
            visibility: None,
            tags: TagSelection::new(MAX_TAGS),
            validation: ListValidation::default(),
        }
    }
}

impl ListForm {
    pub fn is_edit_mode(&self) -> bool {
        self.edit_id.is_some()
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit_mode() { "Edit List" } else { "Create List" }
    }

    fn validate(&mut self) {
        let length = self.name.chars().count();
        self.validation.name = if length <= MIN_LIST_NAME_LENGTH {
            FieldState::error("List name should be long at least 3 letters")
        } else if length > MAX_LIST_NAME_LENGTH {
            FieldState::error(format!("List name should not exceed {} symbols", MAX_LIST_NAME_LENGTH))
        } else {
            FieldState::valid()
        };

        self.validation.visibility = match &self.visibility {
            Some(v) if v.as_str().is_empty() == false => FieldState::valid(),
            _ => FieldState::error("List visibility should not be empty"),
        };
    }

    fn is_invalid(&self) -> bool {
        any_error(vec![&self.validation.name, &self.validation.visibility])
    }

    fn to_input(&self) -> Option<ListInput> {
        Some(ListInput {
            name: self.name.clone(),
            description: self.description.clone(),
            visibility: self.visibility.clone()?,
            tags: self.tags.tags().to_vec(),
        })
    }
}

pub struct ListDialogController {
    ctx: Context,
    form: Mutex<ListForm>,
}

impl ListDialogController {
    pub fn new(ctx: Context) -> Self {
        Self { ctx, form: Mutex::new(ListForm::default()) }
    }

    pub fn form(&self) -> ListForm {
        lock(&self.form).clone()
    }

    pub fn open_create(&self) {
        *lock(&self.form) = ListForm { is_open: true, ..ListForm::default() };
    }

    /// Fill the dialog with an existing list
    pub fn open_edit(&self, list: &List) {
        *lock(&self.form) = ListForm {
            is_open: true,
            edit_id: Some(list.id.clone()),
            name: list.name.clone(),
            description: list.description.clone(),
            visibility: list.visibility.clone(),
            tags: TagSelection::with_tags(&list.tags, MAX_TAGS),
            validation: ListValidation::default(),
        };
    }

    /// Closing the dialog discards what was typed
    pub fn cancel(&self) {
        *lock(&self.form) = ListForm::default();
    }

    pub fn set_name(&self, name: &str) {
        let mut form = lock(&self.form);
        form.name = name.to_string();
        if name.trim().is_empty() == false {
            form.validation.name.clear();
        }
    }

    pub fn set_description(&self, description: &str) {
        lock(&self.form).description = description.to_string();
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        let mut form = lock(&self.form);
        form.visibility = Some(visibility);
        form.validation.visibility.clear();
    }

    /// Returns false when the tag limit is reached
    pub fn select_tag(&self, tag: &str) -> bool {
        let selected = lock(&self.form).tags.select(tag);
        if selected == false {
            self.ctx.shell.toast(&format!("You can select a maximum of {} tags.", MAX_TAGS));
        }
        selected
    }

    pub fn deselect_tag(&self, tag: &str) {
        lock(&self.form).tags.deselect(tag);
    }

    pub async fn submit(&self) -> Outcome {
        let (edit_id, input) = {
            let mut form = lock(&self.form);
            form.validate();
            if form.is_invalid() {
                log::debug!("List form is invalid: {:?}", form.validation);
                return Outcome::Blocked;
            }
            match form.to_input() {
                Some(input) => (form.edit_id.clone(), input),
                None => return Outcome::Blocked,
            }
        };

        match edit_id {
            None => {
                match self.send(&lists::create_list(&input)).await {
                    Ok(list) => {
                        self.ctx.bus.publish(AppEvent::ListAdded(list));
                        self.cancel();
                        self.ctx.succeed(&format!("List created with name: {}", input.name))
                    },
                    Err(err) => self.ctx.fail("Error creating list", "Failed to create list.", err),
                }
            },
            Some(list_id) => {
                match self.send(&lists::update_list(&list_id, &input)).await {
                    Ok(list) => {
                        self.ctx.bus.publish(AppEvent::ListUpdated(list));
                        self.cancel();
                        self.ctx.succeed(&format!("List updated with name: {}", input.name))
                    },
                    Err(err) => self.ctx.fail("Error updating list", "Failed to update list.", err),
                }
            },
        }
    }

    async fn send(&self, operation: &crate::operations::Operation) -> Result<List, Error> {
        fetch::<List>(self.ctx.transport(), operation)
            .await?
            .ok_or_else(|| Error::Protocol(format!("{} returned no list", operation.name())))
    }
}
