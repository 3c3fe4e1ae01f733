pub mod config;
pub mod error;
pub mod intake;
pub mod models;
pub mod store;
pub mod tracker;

pub use error::{PersistenceError, Result};
pub use models::{job_id, ApplicationStatus, JobPosting, RelatedLink, SavedJobRecord};
pub use store::{JobStore, JsonFileStore, SavedJobs};
pub use tracker::Tracker;
