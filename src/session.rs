//! The session of the current user
//!
//! The backend sets a `user_role` cookie next to its session cookie. Its value is used here for UI gating only
//! (hiding buttons, choosing between "my" and "global" queries): it is readable and forgeable on the client side,
//! so the backend enforces every authorization decision on its own.

use std::sync::Arc;

use bitflags::bitflags;

use crate::user::Role;

/// Name of the cookie carrying the role
pub const ROLE_COOKIE: &str = "user_role";

bitflags! {
    /// What the UI lets the current user do
    pub struct Permissions: u8 {
        /// See own and shared lists
        const VIEW = 1;
        /// Create, edit, complete and delete
        const EDIT = 2;
        /// See every list and todo of the application
        const VIEW_GLOBAL = 4;
    }
}

impl From<Role> for Permissions {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Permissions::VIEW | Permissions::EDIT | Permissions::VIEW_GLOBAL,
            Role::Writer => Permissions::VIEW | Permissions::EDIT,
            Role::Reader => Permissions::VIEW,
        }
    }
}

/// Gives access to the cookies the browser (or HTTP client) would send to the backend
pub trait CookieSource: Send + Sync {
    /// A `Cookie` header value, e.g. `session=abc; user_role=writer`
    fn cookie_header(&self) -> Option<String>;
}

/// A fixed cookie header, for tests and command-line tools
#[derive(Clone, Debug, Default)]
pub struct StaticCookies(pub String);

impl CookieSource for StaticCookies {
    fn cookie_header(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// A snapshot of the session, read once from the cookies
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    has_role_cookie: bool,
    role: Option<Role>,
}

impl Session {
    /// A session without any cookie
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_cookie_header(header: &str) -> Self {
        let mut session = Self::anonymous();
        for pair in header.split(';') {
            let pair = pair.trim();
            let (name, value) = match pair.find('=') {
                None => continue,
                Some(pos) => (pair[..pos].trim(), pair[pos + 1..].trim()),
            };
            if name != ROLE_COOKIE {
                continue;
            }
            session.has_role_cookie = true;
            session.role = match value.parse::<Role>() {
                Ok(role) => Some(role),
                Err(err) => {
                    if value.is_empty() == false {
                        log::warn!("Ignoring {} cookie: {}", ROLE_COOKIE, err);
                    }
                    None
                }
            };
        }
        session
    }

    /// Whether the user went through the login flow. Screens redirect to the login page otherwise
    pub fn is_logged_in(&self) -> bool {
        self.has_role_cookie
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn permissions(&self) -> Permissions {
        match self.role {
            Some(role) => Permissions::from(role),
            None => Permissions::empty(),
        }
    }

    /// Admins and writers may mutate
    pub fn can_edit(&self) -> bool {
        self.permissions().contains(Permissions::EDIT)
    }

    /// Admins see global data instead of their own
    pub fn is_admin(&self) -> bool {
        self.permissions().contains(Permissions::VIEW_GLOBAL)
    }

    /// The role as displayed in the UI, e.g. `WRITER`, or an empty string
    pub fn role_label(&self) -> &'static str {
        self.role.map(|r| r.as_graphql()).unwrap_or("")
    }
}

/// Hands out [`Session`] snapshots to the controllers
///
/// Controllers receive it at construction and read the session once per handler, instead of parsing cookies
/// all over the place.
#[derive(Clone)]
pub struct SessionContext {
    source: Arc<dyn CookieSource>,
}

impl SessionContext {
    pub fn new(source: Arc<dyn CookieSource>) -> Self {
        Self { source }
    }

    /// A context with a fixed cookie header
    pub fn from_cookie_header<S: ToString>(header: S) -> Self {
        Self::new(Arc::new(StaticCookies(header.to_string())))
    }

    /// Reads the cookies now
    pub fn current(&self) -> Session {
        match self.source.cookie_header() {
            None => Session::anonymous(),
            Some(header) => Session::from_cookie_header(&header),
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roles_map_to_permissions() {
        let admin = Session::from_cookie_header("session=abc; user_role=admin");
        assert!(admin.is_logged_in());
        assert!(admin.is_admin());
        assert!(admin.can_edit());
        assert_eq!(admin.role_label(), "ADMIN");

        let writer = Session::from_cookie_header("user_role=writer");
        assert!(writer.can_edit());
        assert!(writer.is_admin() == false);

        let reader = Session::from_cookie_header("user_role=reader;theme=dark");
        assert!(reader.can_edit() == false);
        assert_eq!(reader.permissions(), Permissions::VIEW);
    }

    #[test]
    fn empty_role_is_logged_in_without_permissions() {
        let session = Session::from_cookie_header("user_role=");
        assert!(session.is_logged_in());
        assert_eq!(session.role(), None);
        assert!(session.permissions().is_empty());
    }

    #[test]
    fn other_cookies_are_not_a_session() {
        let session = Session::from_cookie_header("my_user_role=admin; user_roles=admin");
        assert!(session.is_logged_in() == false);
        assert_eq!(SessionContext::from_cookie_header("").current(), Session::anonymous());
    }
}
