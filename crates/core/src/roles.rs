//! User roles for access control.
//!
//! Ordered from least to most privileged. The string values must match the
//! `CHECK` constraint on `users.role`.

define_text_enum! {
    /// Role attached to every user account.
    UserRole {
        Viewer = "viewer",
        Operator = "operator",
        Admin = "admin",
    }
}

impl UserRole {
    /// Operators and admins may mutate fleet state.
    pub fn can_operate(self) -> bool {
        matches!(self, UserRole::Operator | UserRole::Admin)
    }

    pub fn is_admin(self) -> bool {
        self == UserRole::Admin
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Viewer
    }
}
