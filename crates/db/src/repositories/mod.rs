//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod applicant_repo;
pub mod attachment_repo;
pub mod order_repo;
pub mod plan_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod visa_type_repo;

pub use applicant_repo::ApplicantRepo;
pub use attachment_repo::AttachmentRepo;
pub use order_repo::OrderRepo;
pub use plan_repo::PlanRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use visa_type_repo::VisaTypeRepo;
