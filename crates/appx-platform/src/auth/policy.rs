//! Access Policy
//!
//! Static table mapping each endpoint class to its access rule. One rule per class,
//! exact role names, no inheritance.

use tracing::debug;

use super::principal::Principal;
use crate::shared::error::PlatformError;

/// Role granting access to the administrative endpoints
pub const APPX_ADMIN_ROLE: &str = "APPX-Admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    Public,
    Secured,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRule {
    pub auth_required: bool,
    pub required_role: Option<&'static str>,
}

impl EndpointClass {
    pub const fn rule(self) -> AccessRule {
        match self {
            EndpointClass::Public => AccessRule {
                auth_required: false,
                required_role: None,
            },
            EndpointClass::Secured => AccessRule {
                auth_required: true,
                required_role: None,
            },
            EndpointClass::Admin => AccessRule {
                auth_required: true,
                required_role: Some(APPX_ADMIN_ROLE),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthenticated,
    Forbidden,
}

/// Decide whether `principal` may use an endpoint governed by `rule`.
///
/// An absent principal and an unauthenticated one are the same thing here.
pub fn authorize(principal: Option<&Principal>, rule: AccessRule) -> Decision {
    if !rule.auth_required {
        return Decision::Allow;
    }

    let Some(principal) = principal.filter(|p| p.authenticated) else {
        return Decision::Unauthenticated;
    };

    match rule.required_role {
        None => Decision::Allow,
        Some(role) if principal.has_role(role) => Decision::Allow,
        Some(_) => Decision::Forbidden,
    }
}

/// Look up the rule for `class` and turn a denial into the matching error.
pub fn enforce(class: EndpointClass, principal: &Principal) -> Result<(), PlatformError> {
    let decision = authorize(Some(principal), class.rule());
    debug!(
        endpoint = ?class,
        subject = %principal.subject,
        decision = ?decision,
        "Access decision"
    );

    match decision {
        Decision::Allow => Ok(()),
        Decision::Unauthenticated => Err(PlatformError::Unauthenticated),
        Decision::Forbidden => Err(PlatformError::Forbidden),
    }
}
