//! Employee persistence.
//!
//! [`EmployeeStore`] is the only owner of employee records. It enforces
//! `emp_id` uniqueness and hashes the password before any record is written.

use async_trait::async_trait;
use derive_more::Display;

use crate::auth::password::{PasswordDigest, PasswordError};
use crate::model::employee::{
    Employee, EmployeeSummary, HashedEmployee, NewEmployee, ProfileImage,
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryEmployeeStore;
pub use mysql::MySqlEmployeeStore;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "employee id '{}' already exists", _0)]
    DuplicateKey(String),
    #[display(fmt = "{}", _0)]
    Password(PasswordError),
    #[display(fmt = "storage failure: {}", _0)]
    Storage(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<PasswordError> for StoreError {
    fn from(e: PasswordError) -> Self {
        StoreError::Password(e)
    }
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Hashes the password, then persists the record.
    ///
    /// Fails with [`StoreError::DuplicateKey`] when `emp_id` is taken, in which
    /// case nothing is written.
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let password = PasswordDigest::compute_blocking(employee.password.clone()).await?;
        self.persist(HashedEmployee::seal(employee, password)).await
    }

    /// Writes an already hashed record. Must fail atomically on a duplicate `emp_id`.
    async fn persist(&self, employee: HashedEmployee) -> Result<Employee, StoreError>;

    async fn find_by_emp_id(&self, emp_id: &str) -> Result<Option<Employee>, StoreError>;

    /// Every record, in insertion order, without password data.
    async fn list_all(&self) -> Result<Vec<EmployeeSummary>, StoreError>;

    /// The stored photo, or `None` when the employee or the photo is missing.
    async fn find_profile_image(&self, emp_id: &str)
    -> Result<Option<ProfileImage>, StoreError>;

    /// Releases the backing resources. Called once on shutdown.
    async fn close(&self);
}
