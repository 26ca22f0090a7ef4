// handlers/mod.rs - Three access tiers
//
// Public (no identity needed) → Protected (authenticated caller) → Elevated
// (caller in the admin set). The tier is enforced by route_layer in lib.rs,
// never inside a handler.

pub mod elevated;
pub mod protected;
pub mod public;
pub mod resource;
