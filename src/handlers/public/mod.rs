// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Read-only content, contact intake, search and the admin check. A bearer
// token is optional here; it is only consulted by the admin check.

pub mod about;
pub mod admin_check;
pub mod campaigns;
pub mod contact;
pub mod publications;
pub mod search;
