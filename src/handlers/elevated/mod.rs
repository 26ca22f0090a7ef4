// handlers/elevated/mod.rs - Administrator handlers
//
// Route Prefix: /api/admin
// Middleware: require_access(Access::Admin). Unauthenticated callers get 401
// before the admin set is consulted; non-admins get 403.
//
// Content tables use the generic handlers in handlers::resource; the modules
// here cover resources with their own procedures.

pub mod campaigns;
pub mod contact;
pub mod publications;
pub mod users;
