mod connection;
mod error;
pub mod introspect;
pub mod person;
pub mod query;
pub mod schema;

pub use connection::{ConnectionConfig, ConnectionSource, Database, TransportSecurity, DEFAULT_DATABASE_URL};
pub use error::{DbError, Result};
pub use person::{NewPerson, Person};
pub use schema::{FieldDef, FieldType, SyncReport, TableSchema, PERSON_SCHEMA};
