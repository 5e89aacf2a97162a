pub mod loader;
pub mod schema;

pub use loader::{load_job, load_job_from_str, validate_job_file};
pub use schema::{JobFile, JobSection, LoadedJob};
