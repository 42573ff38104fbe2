//! Shared test schema and executor doubles.
//!
//! The schema mirrors the canonical scenario: contacts and companies
//! linked by an `employee` relationship, companies linked to countries,
//! plus derived and multivalue properties.

use std::cell::RefCell;

use relstore::executor::{ExecutorError, SqlExecutor};
use relstore::schema_catalog::{DataSchema, SchemaConfig};

pub const TEST_SCHEMA_YAML: &str = r#"
properties:
  - id: name
    compact_id: 1
    data_type: string
  - id: birthday
    compact_id: 2
    data_type: datetime
  - id: is_primary
    compact_id: 3
    data_type: boolean
  - id: created
    compact_id: 4
    data_type: datetime
  - id: phone
    compact_id: 5
    data_type: string
    multivalue: true
  - id: birthday_year
    compact_id: 6
    data_type: integer
  - id: created_year
    compact_id: 7
    data_type: integer
  - id: id_x10
    compact_id: 8
    data_type: integer
classes:
  - id: contacts
    compact_id: 1
    properties:
      - property: name
      - property: birthday
      - property: is_primary
      - property: phone
      - property: birthday_year
        source: birthday
        formula: extract_year
      - property: id_x10
        source: id
        template: "{0}*10"
  - id: companies
    compact_id: 2
    properties:
      - property: name
      - property: created
      - property: created_year
        source: created
        formula: extract_year
  - id: countries
    compact_id: 3
    properties:
      - property: name
  - id: employee
    compact_id: 4
    is_predicate: true
  - id: country
    compact_id: 5
    is_predicate: true
relationships:
  - id: contacts_employee_companies
    predicate: employee
    subject: contacts
    object: companies
    multiplicity: false
  - id: companies_country_countries
    predicate: country
    subject: companies
    object: countries
    multiplicity: false
  - id: companies_employee_contacts
    predicate: employee
    subject: companies
    object: contacts
    multiplicity: true
"#;

/// Same schema with the employee relationship registered for reverse
/// traversal from the companies side.
pub const REVERSIBLE_SCHEMA_YAML: &str = r#"
properties:
  - id: name
    compact_id: 1
    data_type: string
classes:
  - id: contacts
    compact_id: 1
    properties:
      - property: name
  - id: companies
    compact_id: 2
    properties:
      - property: name
  - id: employee
    compact_id: 4
    is_predicate: true
relationships:
  - id: contacts_employee_companies
    predicate: employee
    subject: contacts
    object: companies
    multiplicity: false
    reverse_multiplicity: false
"#;

pub fn test_schema() -> DataSchema {
    SchemaConfig::from_yaml_str(TEST_SCHEMA_YAML)
        .expect("fixture schema parses")
        .build()
        .expect("fixture schema builds")
}

pub fn reversible_schema() -> DataSchema {
    SchemaConfig::from_yaml_str(REVERSIBLE_SCHEMA_YAML)
        .expect("fixture schema parses")
        .build()
        .expect("fixture schema builds")
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records every executed statement and replays canned results.
pub struct RecordingExecutor {
    pub ids: Vec<i64>,
    pub count: i64,
    pub executed: RefCell<Vec<String>>,
}

impl RecordingExecutor {
    pub fn returning_ids(ids: Vec<i64>) -> Self {
        RecordingExecutor {
            ids,
            count: 0,
            executed: RefCell::new(Vec::new()),
        }
    }

    pub fn returning_count(count: i64) -> Self {
        RecordingExecutor {
            ids: Vec::new(),
            count,
            executed: RefCell::new(Vec::new()),
        }
    }

    pub fn last_sql(&self) -> String {
        self.executed
            .borrow()
            .last()
            .cloned()
            .expect("a statement was executed")
    }
}

impl SqlExecutor for RecordingExecutor {
    fn execute_ids(&self, sql: &str) -> Result<Vec<i64>, ExecutorError> {
        self.executed.borrow_mut().push(sql.to_string());
        Ok(self.ids.clone())
    }

    fn execute_count(&self, sql: &str) -> Result<i64, ExecutorError> {
        self.executed.borrow_mut().push(sql.to_string());
        Ok(self.count)
    }
}

mockall::mock! {
    pub Executor {}

    impl SqlExecutor for Executor {
        fn execute_ids(&self, sql: &str) -> Result<Vec<i64>, ExecutorError>;
        fn execute_count(&self, sql: &str) -> Result<i64, ExecutorError>;
    }
}
