//! User profile types.

use serde::{Deserialize, Deserializer, Serialize};

/// Profile of the signed-in user.
///
/// `roles` and `permissions` are grants carried by the login response and
/// feed the permission evaluator alongside the menu tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Server-side identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub nickname: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: String,
    /// Phone number, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Role names granted to the user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Permission codes granted directly to the user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

impl UserInfo {
    /// Creates a profile with just an id and a username.
    #[must_use]
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            user_id: user_id.into(),
            nickname: username.clone(),
            username,
            ..Self::default()
        }
    }

    /// Adds a role grant.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Adds a permission grant.
    #[must_use]
    pub fn with_permission(mut self, code: impl Into<String>) -> Self {
        self.permissions.push(code.into());
        self
    }

    /// Name to show in the UI.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.username
        } else {
            &self.nickname
        }
    }
}

/// User block of the web-admin login response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminUser {
    /// Server-side identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Login name.
    pub username: String,
    /// E-mail address.
    #[serde(default)]
    pub email: String,
    /// Primary role.
    #[serde(default)]
    pub role: Option<String>,
    /// Additional roles.
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    /// Permission codes.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl From<AdminUser> for UserInfo {
    fn from(user: AdminUser) -> Self {
        let mut roles: Vec<String> = user.role.into_iter().collect();
        for role in user.roles.unwrap_or_default() {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        Self {
            user_id: user.id,
            nickname: user.username.clone(),
            username: user.username,
            avatar: String::new(),
            phone: None,
            roles,
            permissions: user.permissions.unwrap_or_default(),
        }
    }
}

/// Accepts ids sent either as JSON strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}
