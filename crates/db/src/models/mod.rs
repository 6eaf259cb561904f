//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and updates where the API accepts them

pub mod control_values;
pub mod environment;
pub mod member;
pub mod message_template;
pub mod notification_group;
pub mod organization;
pub mod preferences;
pub mod step;
pub mod user;
pub mod workflow;
