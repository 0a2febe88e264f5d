//! Directory result records

use serde::{Deserialize, Serialize};

/// A user entry reduced to the fields callers care about.
///
/// Every field starts out `None` and is filled from the entry's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub is_user: bool,
    /// `<domain>\<sAMAccountName>`, lower-cased
    pub logon_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    /// `thumbnailPhoto`, base64 encoded
    pub photo: Option<String>,
    #[serde(rename = "workPhoneNumber")]
    pub work_phone: Option<String>,
    #[serde(rename = "mobilePhoneNumber")]
    pub mobile_phone: Option<String>,
    pub position: Option<String>,
}

impl UserRecord {
    pub fn new() -> Self {
        Self {
            is_user: true,
            logon_name: None,
            display_name: None,
            email: None,
            photo: None,
            work_phone: None,
            mobile_phone: None,
            position: None,
        }
    }
}

impl Default for UserRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// A group entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub is_group: bool,
    /// `<domain>\<cn>`, lower-cased
    pub name: Option<String>,
}

impl GroupRecord {
    pub fn new() -> Self {
        Self {
            is_group: true,
            name: None,
        }
    }
}

impl Default for GroupRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// One mapped search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectoryRecord {
    User(UserRecord),
    Group(GroupRecord),
}

impl DirectoryRecord {
    pub fn as_user(&self) -> Option<&UserRecord> {
        match self {
            DirectoryRecord::User(user) => Some(user),
            DirectoryRecord::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupRecord> {
        match self {
            DirectoryRecord::Group(group) => Some(group),
            DirectoryRecord::User(_) => None,
        }
    }

    /// Logon name for users, group name for groups
    pub fn name(&self) -> Option<&str> {
        match self {
            DirectoryRecord::User(user) => user.logon_name.as_deref(),
            DirectoryRecord::Group(group) => group.name.as_deref(),
        }
    }
}

impl From<UserRecord> for DirectoryRecord {
    fn from(user: UserRecord) -> Self {
        DirectoryRecord::User(user)
    }
}

impl From<GroupRecord> for DirectoryRecord {
    fn from(group: GroupRecord) -> Self {
        DirectoryRecord::Group(group)
    }
}
