/// Middleware for the API server
///
/// - `route_guard`: redirects unauthorized visitors away from admin pages
/// - `security`: hardening response headers

pub mod route_guard;
pub mod security;
