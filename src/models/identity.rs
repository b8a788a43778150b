use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    FieldEmployee,
    OfficeEmployee,
    Contact,
    Admin,
}

impl EmployeeRole {
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "field_employee" | "field" => Some(Self::FieldEmployee),
            "office_employee" | "office" => Some(Self::OfficeEmployee),
            "contact" => Some(Self::Contact),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::FieldEmployee => "field_employee",
            EmployeeRole::OfficeEmployee => "office_employee",
            EmployeeRole::Contact => "contact",
            EmployeeRole::Admin => "admin",
        }
    }

    pub fn can_visit(&self) -> bool {
        matches!(self, EmployeeRole::FieldEmployee)
    }
}

/// The acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeIdentity {
    pub employee_id: String,
    pub role: EmployeeRole,
}

impl EmployeeIdentity {
    pub fn new(employee_id: impl Into<String>, role: EmployeeRole) -> Self {
        Self {
            employee_id: employee_id.into(),
            role,
        }
    }
}
