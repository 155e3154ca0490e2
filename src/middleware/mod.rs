pub mod auth;
pub mod guards;

pub use auth::{authenticate, CurrentUser};
pub use guards::{require_admin, require_agent_or_admin, require_manager_or_admin};
