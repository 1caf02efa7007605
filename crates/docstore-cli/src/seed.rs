//! Sample employee records.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use docstore::Driver;

/// Collection the sample records are written to.
pub const EMPLOYEE_COLLECTION: &str = "employee";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub name: String,
    pub age: Number,
    pub contact: String,
    pub company: String,
    pub address: Address,
}

impl User {
    fn sample(name: &str) -> Self {
        Self {
            name: name.to_string(),
            age: Number::from(42),
            contact: name.to_string(),
            company: name.to_string(),
            address: Address {
                city: "Earth".to_string(),
                state: "USA".to_string(),
                country: "USA".to_string(),
                pincode: 1234,
            },
        }
    }
}

/// Returns the four sample employees.
pub fn sample_employees() -> Vec<User> {
    ["SpaceX", "Tesla", "Google", "Apple"]
        .into_iter()
        .map(User::sample)
        .collect()
}

/// Writes every sample employee to `collection`, keyed by name.
///
/// Stops at the first failure.
pub fn seed(db: &Driver, collection: &str) -> docstore::Result<usize> {
    let employees = sample_employees();
    for employee in &employees {
        db.write(collection, &employee.name, employee)?;
    }
    Ok(employees.len())
}
