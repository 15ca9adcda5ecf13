//! The dialog sharing a list with other users, and revoking their access

use std::sync::Mutex;

use super::{Context, Outcome};
use crate::access::ListAccess;
use crate::client::fetch_all;
use crate::error::Error;
use crate::ids::{ListId, UserId};
use crate::operations::lists::{self, ListAccessInput};
use crate::operations::users;
use crate::user::{Role, User};
use crate::view_state::lock;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddUserForm {
    pub is_open: bool,
    pub list_id: ListId,
    pub owner: Option<UserId>,
    /// Users the list can be shared with
    pub candidates: Vec<User>,
    /// Accesses of everyone but the owner, pending ones included
    pub collaborators: Vec<ListAccess>,
    pub selected_user: Option<UserId>,
}

impl AddUserForm {
    /// Whether there is anybody left to share the list with
    pub fn has_candidates(&self) -> bool {
        self.candidates.is_empty() == false
    }
}

pub struct AddUserDialogController {
    ctx: Context,
    form: Mutex<AddUserForm>,
}

impl AddUserDialogController {
    pub fn new(ctx: Context) -> Self {
        Self { ctx, form: Mutex::new(AddUserForm::default()) }
    }

    pub fn form(&self) -> AddUserForm {
        lock(&self.form).clone()
    }

    pub async fn open(&self, list_id: &ListId, owner: Option<UserId>) -> Outcome {
        *lock(&self.form) = AddUserForm {
            is_open: true,
            list_id: list_id.clone(),
            owner: owner.clone(),
            ..AddUserForm::default()
        };

        let (candidates, collaborators) = match self.fetch_users(list_id, owner.as_ref()).await {
            Ok(users) => users,
            Err(err) => return self.ctx.fail("Error fetching users", "Failed to fetch users.", err),
        };
        let mut form = lock(&self.form);
        if &form.list_id != list_id {
            return Outcome::Discarded;
        }
        form.candidates = candidates;
        form.collaborators = collaborators;
        Outcome::Applied
    }

    async fn fetch_users(&self, list_id: &ListId, owner: Option<&UserId>) -> Result<(Vec<User>, Vec<ListAccess>), Error> {
        let transport = self.ctx.transport();
        let all_users = fetch_all::<User>(transport, &users::get_users()).await?;
        let members = fetch_all::<User>(transport, &users::get_users_by_list(list_id)).await?;
        let accesses = fetch_all::<ListAccess>(transport, &lists::get_accesses_by_list_id(list_id)).await?;

        let candidates = all_users
            .into_iter()
            .filter(|u| members.iter().any(|m| m.id == u.id) == false)
            .filter(|u| Some(&u.id) != owner)
            .collect();
        let collaborators = accesses.into_iter().filter(|a| a.is_owner() == false).collect();
        Ok((candidates, collaborators))
    }

    pub fn select_user(&self, user_id: &UserId) {
        lock(&self.form).selected_user = Some(user_id.clone());
    }

    /// Closes the dialog, forgetting the selection
    pub fn cancel(&self) {
        let mut form = lock(&self.form);
        form.selected_user = None;
        form.is_open = false;
    }

    /// Invite the selected user, with the role they have in the application
    pub async fn submit(&self) -> Outcome {
        let input = {
            let form = lock(&self.form);
            let selected = form
                .selected_user
                .as_ref()
                .and_then(|id| form.candidates.iter().find(|u| &u.id == id));
            let input = selected.map(|user| ListAccessInput {
                list_id: form.list_id.clone(),
                user_id: user.id.clone(),
                access_level: user.role.unwrap_or(Role::Reader),
            });
            input
        };
        let input = match input {
            Some(input) => input,
            None => {
                self.ctx.shell.toast("Selected user not found.");
                return Outcome::Blocked;
            },
        };

        let result = self.ctx.transport.execute(&lists::add_list_access(&input)).await;
        self.cancel();
        match result {
            Ok(_) => {
                lock(&self.form).candidates.retain(|u| u.id != input.user_id);
                self.ctx.succeed("Successfully added new collaborator")
            },
            Err(err) => self.ctx.fail("Error adding collaborator to the list", "Failed to add collaborator", err),
        }
    }

    /// Revoke the access of a collaborator. To be called once the user confirmed
    pub async fn remove_collaborator(&self, user_id: &UserId) -> Outcome {
        let list_id = lock(&self.form).list_id.clone();
        if let Err(err) = self.ctx.transport.execute(&lists::remove_collaborator(&list_id, user_id)).await {
            return self.ctx.fail("Error removing collaborator", "Failed to remove collaborator", err);
        }
        lock(&self.form)
            .collaborators
            .retain(|a| a.user.as_ref().map(|u| &u.id) != Some(user_id));
        self.ctx.succeed("Collaborator removed successfully")
    }
}
