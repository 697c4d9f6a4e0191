use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::password::PasswordDigest;

/// Binary profile photo together with the MIME type it was uploaded with.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ProfileImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for ProfileImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileImage")
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// A validated employee that has not been persisted yet.
///
/// The password is still plaintext here; the store hashes it as part of
/// [`EmployeeStore::insert`](crate::store::EmployeeStore::insert).
pub struct NewEmployee {
    pub name: String,
    pub designation: String,
    pub emp_id: String,
    pub fav_tools: Vec<String>,
    pub password: String,
    pub profile_image: Option<ProfileImage>,
}

impl fmt::Debug for NewEmployee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewEmployee")
            .field("name", &self.name)
            .field("designation", &self.designation)
            .field("emp_id", &self.emp_id)
            .field("fav_tools", &self.fav_tools)
            .field("password", &"<redacted>")
            .field("profile_image", &self.profile_image)
            .finish()
    }
}

/// A [`NewEmployee`] whose password has gone through the hasher.
///
/// Only [`HashedEmployee::seal`] builds one, so every persisted record carries
/// a digest instead of the submitted plaintext.
#[derive(Debug)]
pub struct HashedEmployee {
    pub name: String,
    pub designation: String,
    pub emp_id: String,
    pub fav_tools: Vec<String>,
    pub password: PasswordDigest,
    pub profile_image: Option<ProfileImage>,
}

impl HashedEmployee {
    pub(crate) fn seal(employee: NewEmployee, password: PasswordDigest) -> Self {
        Self {
            name: employee.name,
            designation: employee.designation,
            emp_id: employee.emp_id,
            fav_tools: employee.fav_tools,
            password,
            profile_image: employee.profile_image,
        }
    }

    pub fn into_employee(self, id: u64) -> Employee {
        Employee {
            id,
            name: self.name,
            designation: self.designation,
            emp_id: self.emp_id,
            fav_tools: self.fav_tools,
            password: self.password,
            profile_image: self.profile_image,
        }
    }
}

/// A persisted employee record.
#[derive(Debug, Clone)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub designation: String,
    pub emp_id: String,
    pub fav_tools: Vec<String>,
    pub password: PasswordDigest,
    pub profile_image: Option<ProfileImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageInfo {
    #[schema(example = "image/jpeg")]
    pub content_type: String,
    #[schema(example = 48213)]
    pub size: u64,
}

/// Public projection of an employee. There is no password field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "name": "Jane Doe",
        "designation": "Backend Engineer",
        "empId": "E100",
        "favTools": ["Git", "Docker", "AWS"],
        "profileImage": { "contentType": "image/jpeg", "size": 48213 }
    })
)]
pub struct EmployeeSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "Backend Engineer")]
    pub designation: String,
    #[schema(example = "E100")]
    pub emp_id: String,
    pub fav_tools: Vec<String>,
    #[schema(nullable = true)]
    pub profile_image: Option<ProfileImageInfo>,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            designation: employee.designation.clone(),
            emp_id: employee.emp_id.clone(),
            fav_tools: employee.fav_tools.clone(),
            profile_image: employee.profile_image.as_ref().map(|image| ProfileImageInfo {
                content_type: image.content_type.clone(),
                size: image.len() as u64,
            }),
        }
    }
}

/// Favorite tools as submitted: either a list or one comma separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FavTools {
    List(Vec<String>),
    Csv(String),
}

impl FavTools {
    /// Canonical ordered list of trimmed, non-empty tool names.
    pub fn normalize(self) -> Vec<String> {
        let parts: Vec<String> = match self {
            FavTools::List(items) => items,
            FavTools::Csv(raw) => raw.split(',').map(str::to_owned).collect(),
        };

        parts
            .into_iter()
            .map(|tool| tool.trim().to_owned())
            .filter(|tool| !tool.is_empty())
            .collect()
    }
}
