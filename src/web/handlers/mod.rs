pub mod application_handlers;
pub mod auth_handlers;
pub mod company_handlers;
pub mod content_handlers;
pub mod job_handlers;
pub mod profile_handlers;
pub mod saved_job_handlers;
pub mod system_handlers;

pub use application_handlers::*;
pub use auth_handlers::*;
pub use company_handlers::*;
pub use content_handlers::*;
pub use job_handlers::*;
pub use profile_handlers::*;
pub use saved_job_handlers::*;
pub use system_handlers::*;
