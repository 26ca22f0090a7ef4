// handlers/protected/mod.rs - Handlers for any authenticated caller
//
// Route Prefix: /api/profile
// Middleware: require_access(Access::Authenticated); handlers read the
// caller from the `Identity` request extension.

pub mod profile;
pub mod publications;
