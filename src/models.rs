use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::employee::{EmployeeSummary, FavTools, NewEmployee, ProfileImage};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginReqDto {
    #[schema(example = "E100")]
    pub emp_id: String,
    #[schema(example = "secret1")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "E100")]
    pub emp_id: String,
    #[schema(example = "Backend Engineer")]
    pub designation: String,
    #[schema(example = json!(["Git", "Docker"]))]
    pub fav_tools: Vec<String>,
}

/// JSON variant of employee creation (no photo).
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeReq {
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[schema(example = "Backend Engineer")]
    pub designation: Option<String>,
    #[schema(example = "E100")]
    pub emp_id: Option<String>,
    #[schema(example = "Git,Docker,AWS")]
    pub fav_tools: Option<FavTools>,
    #[schema(example = "secret1")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateEmployeeResponse {
    #[schema(example = "Employee created successfully!")]
    pub message: String,
    pub employee: EmployeeSummary,
}

/// Raw create request, gathered from either a multipart form or a JSON body.
#[derive(Default)]
pub struct EmployeeSubmission {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub emp_id: Option<String>,
    pub fav_tools: Option<FavTools>,
    pub password: Option<String>,
    pub profile_image: Option<ProfileImage>,
}

impl From<CreateEmployeeReq> for EmployeeSubmission {
    fn from(req: CreateEmployeeReq) -> Self {
        Self {
            name: req.name,
            designation: req.designation,
            emp_id: req.emp_id,
            fav_tools: req.fav_tools,
            password: req.password,
            profile_image: None,
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{field} is required")))
}

impl EmployeeSubmission {
    /// Checks required fields and normalizes favTools into a list.
    pub fn validate(self) -> Result<NewEmployee, ApiError> {
        let name = required(self.name, "name")?;
        let designation = required(self.designation, "designation")?;
        let emp_id = required(self.emp_id, "empId")?;

        // whitespace is significant in a password, only emptiness is checked
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Validation("password is required".into()))?;

        let fav_tools = self
            .fav_tools
            .ok_or_else(|| ApiError::Validation("favTools is required".into()))?
            .normalize();

        Ok(NewEmployee {
            name,
            designation,
            emp_id,
            fav_tools,
            password,
            profile_image: self.profile_image,
        })
    }
}
