//! Record Store - the fixed in-memory table the viewer renders.

use serde::{Deserialize, Serialize};

/// Ordered schema shared by every record.
pub const FIELD_NAMES: [&str; 5] = ["id", "name", "age", "city", "occupation"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub age: u32,
    pub city: String,
    pub occupation: String,
}

impl Record {
    /// Display value for a schema key. Unknown keys resolve to `None`.
    pub fn get(&self, field: &str) -> Option<String> {
        match field {
            "id" => Some(self.id.to_string()),
            "name" => Some(self.name.clone()),
            "age" => Some(self.age.to_string()),
            "city" => Some(self.city.clone()),
            "occupation" => Some(self.occupation.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// The canonical seed records. Data is compiled in; the store has no
    /// mutation operations and no error conditions.
    pub fn seed() -> Self {
        let records = vec![
            Record {
                id: 1,
                name: "John Doe".to_string(),
                age: 30,
                city: "New York".to_string(),
                occupation: "Engineer".to_string(),
            },
            Record {
                id: 2,
                name: "Jane Smith".to_string(),
                age: 25,
                city: "San Francisco".to_string(),
                occupation: "Designer".to_string(),
            },
            Record {
                id: 3,
                name: "Bob Johnson".to_string(),
                age: 35,
                city: "Chicago".to_string(),
                occupation: "Manager".to_string(),
            },
            Record {
                id: 4,
                name: "Alice Brown".to_string(),
                age: 28,
                city: "Los Angeles".to_string(),
                occupation: "Developer".to_string(),
            },
        ];

        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Ordered schema field names.
    pub fn field_names(&self) -> &'static [&'static str] {
        &FIELD_NAMES
    }

    /// Schema keys the resolver prompt offers for matching. The record id is
    /// an identity column, not a search target.
    pub fn queryable_field_names(&self) -> &'static [&'static str] {
        &FIELD_NAMES[1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_shape() {
        let store = RecordStore::seed();
        assert_eq!(store.records().len(), 4);
        assert_eq!(store.field_names(), &["id", "name", "age", "city", "occupation"]);
        assert_eq!(store.queryable_field_names(), &["name", "age", "city", "occupation"]);
    }

    #[test]
    fn test_get_by_field_name() {
        let store = RecordStore::seed();
        let first = &store.records()[0];
        assert_eq!(first.get("name").as_deref(), Some("John Doe"));
        assert_eq!(first.get("age").as_deref(), Some("30"));
        assert_eq!(first.get("id").as_deref(), Some("1"));
        assert_eq!(first.get("salary"), None);
    }
}
