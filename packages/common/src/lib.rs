pub mod application_status;
pub mod storage;

pub use application_status::{ApplicationStatus, StatusActor};
