// handlers/mod.rs - 3-tier handler architecture
//
// Public (identity optional) → Protected (bearer token) → Elevated (admin).
// Each tier exposes `routes()`; `app::router` applies the tier's middleware.

pub mod form;
pub mod utils;

pub mod elevated; // Tier 3: admin only (/api/admin/*)
pub mod protected; // Tier 2: bearer token required
pub mod public; // Tier 1: anonymous or identified
