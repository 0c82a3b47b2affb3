use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: u64,
    pub name: Option<String>,
    pub grade_id: Option<String>,
    pub bus_no: Option<i32>,
    pub note: Option<String>,
}

impl Student {
    pub fn transport(&self) -> Transport {
        Transport::from_bus_no(self.bus_no)
    }
}

/// How a student gets to school, derived from the bus assignment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Bus,
    Car,
}

impl Transport {
    pub fn from_bus_no(bus_no: Option<i32>) -> Self {
        match bus_no {
            Some(n) if n > 0 => Transport::Bus,
            _ => Transport::Car,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Transport::Bus => "Bus",
            Transport::Car => "Car",
        }
    }
}
