use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{EmployeeStore, StoreError};
use crate::model::employee::{Employee, EmployeeSummary, HashedEmployee, ProfileImage};

#[derive(Default)]
struct Rows {
    next_id: u64,
    employees: Vec<Employee>,
}

/// Process-local store. The uniqueness check and the push happen under one lock.
#[derive(Default)]
pub struct MemoryEmployeeStore {
    rows: Mutex<Rows>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, Rows>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Storage("employee store lock poisoned".into()))
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn persist(&self, employee: HashedEmployee) -> Result<Employee, StoreError> {
        let mut rows = self.rows()?;

        if rows.employees.iter().any(|e| e.emp_id == employee.emp_id) {
            return Err(StoreError::DuplicateKey(employee.emp_id));
        }

        rows.next_id += 1;
        let stored = employee.into_employee(rows.next_id);
        rows.employees.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_emp_id(&self, emp_id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .rows()?
            .employees
            .iter()
            .find(|e| e.emp_id == emp_id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<EmployeeSummary>, StoreError> {
        Ok(self
            .rows()?
            .employees
            .iter()
            .map(EmployeeSummary::from)
            .collect())
    }

    async fn find_profile_image(
        &self,
        emp_id: &str,
    ) -> Result<Option<ProfileImage>, StoreError> {
        Ok(self
            .rows()?
            .employees
            .iter()
            .find(|e| e.emp_id == emp_id)
            .and_then(|e| e.profile_image.clone())
            .filter(|image| !image.is_empty()))
    }

    async fn close(&self) {}
}
