use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// Role granted to the signed-in dashboard operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    /// Full management access.
    Admin,
    /// Content and directory editor.
    Editor,
    /// Read-only operator.
    Viewer,
}

impl SessionRole {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Returns whether the role may create, update or delete records.
    #[must_use]
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }
}

impl FromStr for SessionRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::Validation(format!(
                "unknown session role '{value}'"
            ))),
        }
    }
}

impl Display for SessionRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Operator session resolved once by the composition root.
///
/// Screens and gateways receive this value instead of reading cookies or
/// decoding tokens on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    subject: String,
    display_name: String,
    role: SessionRole,
    #[serde(skip_serializing)]
    access_token: Option<String>,
}

impl Session {
    /// Creates a session from already-resolved identity data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        role: SessionRole,
        access_token: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            role,
            access_token: access_token.filter(|token| !token.trim().is_empty()),
        }
    }

    /// Returns the stable subject of the operator.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name shown in the topbar.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the operator role.
    #[must_use]
    pub fn role(&self) -> SessionRole {
        self.role
    }

    /// Returns the bearer token, if the operator is authenticated.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}
