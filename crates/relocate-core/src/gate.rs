//! Operator gate
//!
//! Keeps anyone but the maintainer from rewriting their manifest by
//! accident. Not a security boundary: the identity comes from environment
//! variables.

use std::fmt;

/// `<host>\<user>` identity of whoever runs the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorIdentity {
    pub host: String,
    pub user: String,
}

impl OperatorIdentity {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
        }
    }

    /// Identity of the current process.
    pub fn current() -> Self {
        let host = env_first(&["COMPUTERNAME", "HOSTNAME"])
            .or_else(|| {
                std::fs::read_to_string("/etc/hostname")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| "localhost".to_string());
        let user = env_first(&["USERNAME", "USER"]).unwrap_or_default();
        Self { host, user }
    }
}

fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

impl fmt::Display for OperatorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.host, self.user)
    }
}

/// Compares the running identity with the configured maintainer identity.
#[derive(Debug, Clone)]
pub struct OperatorGate {
    expected: String,
    current: OperatorIdentity,
}

impl OperatorGate {
    /// Gate for the identity of the current process.
    pub fn new(expected: impl Into<String>) -> Self {
        Self::for_identity(expected, OperatorIdentity::current())
    }

    pub fn for_identity(expected: impl Into<String>, current: OperatorIdentity) -> Self {
        Self {
            expected: expected.into(),
            current,
        }
    }

    pub fn current(&self) -> &OperatorIdentity {
        &self.current
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn is_authorized_operator(&self) -> bool {
        self.current.to_string() == self.expected.trim()
    }
}
