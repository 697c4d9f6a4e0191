use crate::api::employee::CreateEmployeeForm;
use crate::error::ErrorBody;
use crate::model::employee::{EmployeeSummary, FavTools, ProfileImageInfo};
use crate::models::{CreateEmployeeReq, CreateEmployeeResponse, LoginReqDto, LoginResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Portal API",
        version = "1.0.0",
        description = r#"
## Employee Portal

Registration and login backend for employee profiles.

### Key Features
- **Registration**: name, designation, employee ID, favorite tools, password and an optional profile photo
- **Login**: checks an employee ID and password against the stored salted hash
- **Directory**: lists every employee, never including password data
- **Profile photos**: served back byte-for-byte with their original content type

### Notes
- Photos must be images of at most 5 MiB
- Requests are rate limited per client IP

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_profile_image,

        crate::auth::handlers::login
    ),
    components(
        schemas(
            CreateEmployeeForm,
            CreateEmployeeReq,
            CreateEmployeeResponse,
            EmployeeSummary,
            ProfileImageInfo,
            FavTools,
            LoginReqDto,
            LoginResponse,
            ErrorBody
        )
    ),
    tags(
        (name = "Employee", description = "Employee registration and directory APIs"),
        (name = "Auth", description = "Employee login"),
    )
)]
pub struct ApiDoc;
