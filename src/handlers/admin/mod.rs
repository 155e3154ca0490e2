// Admin-only management surfaces. Route-level `require_admin` covers both;
// handlers here assume the caller is an admin.
pub mod agents;
pub mod users;
