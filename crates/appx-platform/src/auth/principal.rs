//! Request principal

use std::collections::BTreeSet;

/// Identity and roles of the caller, built per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Opaque stable identity (`sub`)
    pub subject: String,
    pub username: Option<String>,
    pub roles: BTreeSet<String>,
    pub authenticated: bool,
}

impl Principal {
    pub fn authenticated<I, R>(subject: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            subject: subject.into(),
            username: None,
            roles: roles.into_iter().map(Into::into).collect(),
            authenticated: true,
        }
    }

    /// Caller without a usable token
    pub fn anonymous() -> Self {
        Self {
            subject: String::new(),
            username: None,
            roles: BTreeSet::new(),
            authenticated: false,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
