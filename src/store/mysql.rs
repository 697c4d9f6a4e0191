use async_trait::async_trait;
use sqlx::{FromRow, MySqlPool, types::Json};
use tracing::{debug, info};

use super::{EmployeeStore, StoreError};
use crate::auth::password::PasswordDigest;
use crate::model::employee::{
    Employee, EmployeeSummary, HashedEmployee, ProfileImage, ProfileImageInfo,
};

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    name: String,
    designation: String,
    emp_id: String,
    fav_tools: Json<Vec<String>>,
    password: String,
    image_data: Option<Vec<u8>>,
    image_content_type: Option<String>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            name: row.name,
            designation: row.designation,
            emp_id: row.emp_id,
            fav_tools: row.fav_tools.0,
            password: PasswordDigest::from_stored(row.password),
            profile_image: into_image(row.image_data, row.image_content_type),
        }
    }
}

// `password` is never selected here.
#[derive(FromRow)]
struct SummaryRow {
    id: u64,
    name: String,
    designation: String,
    emp_id: String,
    fav_tools: Json<Vec<String>>,
    image_content_type: Option<String>,
    image_size: Option<i64>,
}

impl From<SummaryRow> for EmployeeSummary {
    fn from(row: SummaryRow) -> Self {
        let profile_image = match (row.image_content_type, row.image_size) {
            (Some(content_type), Some(size)) if size > 0 => Some(ProfileImageInfo {
                content_type,
                size: size as u64,
            }),
            _ => None,
        };

        EmployeeSummary {
            id: row.id,
            name: row.name,
            designation: row.designation,
            emp_id: row.emp_id,
            fav_tools: row.fav_tools.0,
            profile_image,
        }
    }
}

fn into_image(data: Option<Vec<u8>>, content_type: Option<String>) -> Option<ProfileImage> {
    match (data, content_type) {
        (Some(data), Some(content_type)) if !data.is_empty() => {
            Some(ProfileImage { content_type, data })
        }
        _ => None,
    }
}

/// MySQL backed store. Uniqueness comes from the `uq_employees_emp_id` index.
pub struct MySqlEmployeeStore {
    pool: MySqlPool,
}

impl MySqlEmployeeStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for MySqlEmployeeStore {
    async fn persist(&self, employee: HashedEmployee) -> Result<Employee, StoreError> {
        let (image_data, image_content_type) = match &employee.profile_image {
            Some(image) => (Some(image.data.as_slice()), Some(image.content_type.as_str())),
            None => (None, None),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (name, designation, emp_id, fav_tools, password, image_data, image_content_type)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.designation)
        .bind(&employee.emp_id)
        .bind(Json(&employee.fav_tools))
        .bind(employee.password.as_str())
        .bind(image_data)
        .bind(image_content_type)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_id();
                debug!(id, emp_id = %employee.emp_id, "Employee row inserted");
                Ok(employee.into_employee(id))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateKey(employee.emp_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_emp_id(&self, emp_id: &str) -> Result<Option<Employee>, StoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, name, designation, emp_id, fav_tools, password,
                   image_data, image_content_type
            FROM employees
            WHERE emp_id = ?
            "#,
        )
        .bind(emp_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Employee::from))
    }

    async fn list_all(&self) -> Result<Vec<EmployeeSummary>, StoreError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, name, designation, emp_id, fav_tools,
                   image_content_type, CAST(LENGTH(image_data) AS SIGNED) AS image_size
            FROM employees
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EmployeeSummary::from).collect())
    }

    async fn find_profile_image(
        &self,
        emp_id: &str,
    ) -> Result<Option<ProfileImage>, StoreError> {
        let row = sqlx::query_as::<_, (Option<Vec<u8>>, Option<String>)>(
            "SELECT image_data, image_content_type FROM employees WHERE emp_id = ?",
        )
        .bind(emp_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(data, content_type)| into_image(data, content_type)))
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("MySQL pool closed");
    }
}
