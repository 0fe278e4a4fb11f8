//! Client application profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which client surface a process is acting as.
///
/// The two mobile apps talk to the same API but differ in their auth
/// endpoints, timeouts, retry policy and storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    /// Gate-verification app used by ticket checkers.
    #[default]
    Checker,
    /// Customer booking app.
    Customer,
}

impl AppKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checker => "checker",
            Self::Customer => "customer",
        }
    }

    /// Path prefix of the auth endpoints (`/mobile-login`, `/mobile-refresh`, ...).
    #[must_use]
    pub const fn auth_prefix(self) -> &'static str {
        match self {
            Self::Checker => "/api/auth",
            Self::Customer => "/api/portal/auth",
        }
    }

    /// Default request timeout in seconds.
    #[must_use]
    pub const fn default_timeout_secs(self) -> u64 {
        match self {
            Self::Checker => 15,
            Self::Customer => 30,
        }
    }

    /// Only the customer app retries transient failures by default.
    #[must_use]
    pub const fn retries_by_default(self) -> bool {
        matches!(self, Self::Customer)
    }

    /// Prefix applied to every persisted storage key.
    #[must_use]
    pub const fn storage_prefix(self) -> &'static str {
        match self {
            Self::Checker => "ssmspl_",
            Self::Customer => "ssmspl_customer_",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checker" => Ok(Self::Checker),
            "customer" => Ok(Self::Customer),
            other => Err(format!("unknown app kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_differ_where_the_apps_differ() {
        assert_eq!(AppKind::Checker.auth_prefix(), "/api/auth");
        assert_eq!(AppKind::Customer.auth_prefix(), "/api/portal/auth");
        assert_eq!(AppKind::Checker.default_timeout_secs(), 15);
        assert_eq!(AppKind::Customer.default_timeout_secs(), 30);
        assert!(!AppKind::Checker.retries_by_default());
        assert!(AppKind::Customer.retries_by_default());
    }

    #[test]
    fn parses_and_displays() {
        for kind in [AppKind::Checker, AppKind::Customer] {
            assert_eq!(kind.as_str().parse::<AppKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert!("admin".parse::<AppKind>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AppKind::Customer).unwrap();
        assert_eq!(json, "\"customer\"");
    }
}
