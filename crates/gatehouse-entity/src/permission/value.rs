//! The canonical `Group.Name.Access` permission value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatehouse_core::error::AppError;

const SEPARATOR: char = '.';

/// One grantable capability, e.g. `Users.Profile.Edit`.
///
/// Construction always validates, so every instance decomposes back into
/// exactly the group, name, and access it was built from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionValue {
    group: String,
    name: String,
    access: String,
}

impl PermissionValue {
    /// Builds a value from its three segments.
    pub fn compose(group: &str, name: &str, access: &str) -> Result<Self, AppError> {
        validate_segment("group", group)?;
        validate_segment("name", name)?;
        validate_segment("access", access)?;
        Ok(Self {
            group: group.to_string(),
            name: name.to_string(),
            access: access.to_string(),
        })
    }

    /// Splits the value back into `(group, name, access)`.
    pub fn decompose(&self) -> (&str, &str, &str) {
        (&self.group, &self.name, &self.access)
    }

    /// The capability group, e.g. `Users`.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The capability name within the group, e.g. `Profile`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The access level, e.g. `Edit`.
    pub fn access(&self) -> &str {
        &self.access
    }
}

fn validate_segment(label: &str, segment: &str) -> Result<(), AppError> {
    if segment.is_empty() {
        return Err(AppError::validation(format!(
            "Permission {label} must not be empty"
        )));
    }
    if segment.contains(SEPARATOR) {
        return Err(AppError::validation(format!(
            "Permission {label} '{segment}' must not contain '{SEPARATOR}'"
        )));
    }
    if segment.chars().any(char::is_whitespace) {
        return Err(AppError::validation(format!(
            "Permission {label} '{segment}' must not contain whitespace"
        )));
    }
    Ok(())
}

impl fmt::Display for PermissionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.group, self.name, self.access)
    }
}

impl FromStr for PermissionValue {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split(SEPARATOR).collect();
        match segments.as_slice() {
            [group, name, access] => Self::compose(group, name, access),
            _ => Err(AppError::validation(format!(
                "Invalid permission value '{s}': expected Group.Name.Access, found {} segment(s)",
                segments.len()
            ))),
        }
    }
}

impl TryFrom<String> for PermissionValue {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PermissionValue> for String {
    fn from(value: PermissionValue) -> Self {
        value.to_string()
    }
}
