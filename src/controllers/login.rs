//! The login screen. Authentication itself happens at an external identity provider

use super::{Context, Outcome};

pub struct LoginController {
    ctx: Context,
}

impl LoginController {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Whether the login button is displayed
    pub fn is_login_visible(&self) -> bool {
        self.ctx.session.current().is_logged_in() == false
    }

    /// Leaves the application for the login flow of the identity provider
    pub fn login(&self) -> Outcome {
        match self.ctx.settings.login_url() {
            Ok(url) => {
                log::info!("Redirecting to {}", url);
                self.ctx.shell.redirect(&url);
                Outcome::Applied
            },
            Err(err) => self.ctx.fail("Invalid login URL", "An error occurred while trying to log in.", err),
        }
    }
}
