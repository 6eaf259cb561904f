//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Workflow-scoped queries
//! always filter by `environment_id` and `organization_id`.

pub mod control_values_repo;
pub mod environment_repo;
pub mod member_repo;
pub mod message_template_repo;
pub mod notification_group_repo;
pub mod organization_repo;
pub mod preferences_repo;
pub mod step_repo;
pub mod user_repo;
pub mod workflow_repo;

pub use control_values_repo::ControlValuesRepo;
pub use environment_repo::EnvironmentRepo;
pub use member_repo::MemberRepo;
pub use message_template_repo::MessageTemplateRepo;
pub use notification_group_repo::NotificationGroupRepo;
pub use organization_repo::OrganizationRepo;
pub use preferences_repo::PreferencesRepo;
pub use step_repo::StepRepo;
pub use user_repo::UserRepo;
pub use workflow_repo::WorkflowRepo;
