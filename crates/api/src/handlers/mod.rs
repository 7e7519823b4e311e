pub mod admin;
pub mod applicant;
pub mod attachment;
pub mod auth;
pub mod form;
pub mod order;
pub mod payment;
pub mod plan;
pub mod visa_type;
