use crate::{
    error::ApiError,
    models::{LoginReqDto, LoginResponse},
    store::EmployeeStore,
};
use actix_web::{HttpResponse, web};
use tracing::{debug, error, info, instrument};

/// Employee login
///
/// Verifies the password against the stored hash. Nothing is issued on
/// success; the response carries the public profile only.
#[utoipa::path(
    post,
    path = "/api/employees/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Invalid password or missing field", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, user),
    fields(emp_id = %user.emp_id)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn EmployeeStore>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let LoginReqDto { emp_id, password } = user.into_inner();

    if emp_id.trim().is_empty() {
        info!("Validation failed: empty empId");
        return Err(ApiError::Validation("empId is required".into()));
    }

    debug!("Fetching employee");

    let employee = match store.find_by_emp_id(emp_id.trim()).await? {
        Some(employee) => employee,
        None => {
            info!("Login failed: employee not found");
            return Err(ApiError::NotFound("Employee not found".into()));
        }
    };

    // an empty password can never match a stored hash
    if password.is_empty() {
        info!("Login failed: empty password");
        return Err(ApiError::InvalidCredentials);
    }

    debug!("Verifying password");

    let matched = employee
        .password
        .clone()
        .verify_blocking(password)
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification failed to run");
            ApiError::Internal(e.to_string())
        })?;

    if !matched {
        info!("Login failed: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        name: employee.name,
        emp_id: employee.emp_id,
        designation: employee.designation,
        fav_tools: employee.fav_tools,
    }))
}
