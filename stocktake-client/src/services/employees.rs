//! Employee endpoints

use stocktake_api_types::{CreateEmployee, Employee, EmployeeFilter, EmployeeId, UpdateEmployee};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct EmployeeService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> EmployeeService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, filter: &EmployeeFilter) -> ClientResult<Vec<Employee>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(department) = &filter.department {
            query.push(("department", department.clone()));
        }
        if let Some(skip) = filter.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        self.transport.get_query("/api/employees", &query).await
    }

    pub async fn get(&self, id: EmployeeId) -> ClientResult<Employee> {
        self.transport.get(&format!("/api/employees/{id}")).await
    }

    pub async fn create(&self, request: &CreateEmployee) -> ClientResult<Employee> {
        self.transport.post("/api/employees", request).await
    }

    pub async fn update(&self, id: EmployeeId, request: &UpdateEmployee) -> ClientResult<Employee> {
        self.transport.put(&format!("/api/employees/{id}"), request).await
    }

    /// Fails with a conflict while the employee still holds assets.
    pub async fn delete(&self, id: EmployeeId) -> ClientResult<()> {
        self.transport.delete(&format!("/api/employees/{id}")).await
    }
}
