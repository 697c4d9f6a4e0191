use actix_multipart::Multipart;
use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    model::employee::EmployeeSummary,
    models::{CreateEmployeeReq, CreateEmployeeResponse, EmployeeSubmission},
    store::EmployeeStore,
    utils::upload::read_employee_form,
};

/// Multipart layout of the create form (documentation only).
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeForm {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "Backend Engineer")]
    pub designation: String,
    #[schema(example = "E100")]
    pub emp_id: String,
    /// Comma separated, or the field repeated once per tool.
    #[schema(example = "Git,Docker,AWS")]
    pub fav_tools: String,
    #[schema(example = "secret1")]
    pub password: String,
    /// Image file, at most 5 MiB.
    #[schema(value_type = Option<String>, format = Binary)]
    pub profile_image: Option<Vec<u8>>,
}

async fn create(
    store: &dyn EmployeeStore,
    submission: EmployeeSubmission,
) -> Result<HttpResponse, ApiError> {
    let employee = submission.validate()?;
    let emp_id = employee.emp_id.clone();

    let stored = store.insert(employee).await.map_err(|e| {
        info!(emp_id = %emp_id, error = %e, "Employee not created");
        ApiError::from(e)
    })?;

    info!(id = stored.id, emp_id = %stored.emp_id, "Employee created");

    Ok(HttpResponse::Created().json(CreateEmployeeResponse {
        message: "Employee created successfully!".to_string(),
        employee: EmployeeSummary::from(&stored),
    }))
}

/// Create Employee
///
/// Also accepts an `application/json` body shaped like `CreateEmployeeReq`
/// (favTools as string or array, no photo).
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body(content = CreateEmployeeForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Employee created successfully", body = CreateEmployeeResponse),
        (status = 400, description = "Missing field or rejected upload", body = ErrorBody),
        (status = 409, description = "Employee ID already exists", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Employee"
)]
#[instrument(name = "create_employee", skip_all)]
pub async fn create_employee(
    store: web::Data<dyn EmployeeStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let submission = read_employee_form(payload).await?;
    create(store.get_ref(), submission).await
}

/// JSON variant of [`create_employee`], routed when the body is `application/json`.
#[instrument(name = "create_employee_json", skip_all)]
pub async fn create_employee_json(
    store: web::Data<dyn EmployeeStore>,
    payload: web::Json<CreateEmployeeReq>,
) -> Result<HttpResponse, ApiError> {
    create(store.get_ref(), payload.into_inner().into()).await
}

/// List Employees
///
/// Full scan on every call; there is no paging.
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees, without passwords", body = [EmployeeSummary]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    store: web::Data<dyn EmployeeStore>,
) -> Result<HttpResponse, ApiError> {
    let employees = store.list_all().await?;
    Ok(HttpResponse::Ok().json(employees))
}

/// Fetch Profile Image
#[utoipa::path(
    get,
    path = "/api/employees/{emp_id}/image",
    params(
        ("emp_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Raw image bytes with Content-Type and Content-Length set"),
        (status = 404, description = "No such employee or no image", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Employee"
)]
pub async fn get_profile_image(
    store: web::Data<dyn EmployeeStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let emp_id = path.into_inner();

    let image = store
        .find_profile_image(&emp_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".into()))?;

    Ok(HttpResponse::Ok()
        .content_type(image.content_type.as_str())
        .insert_header((header::CONTENT_LENGTH, image.len().to_string()))
        .body(image.data))
}
