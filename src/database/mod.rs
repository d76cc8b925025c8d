pub mod counters;
pub mod manager;
pub mod models;
pub mod query;

pub use counters::Counter;
pub use manager::{connect_lazy, health_check, DatabaseError};
pub use query::{
    apply_update, count, execute, fetch_all_json, fetch_one_json, fetch_optional_json, fetch_scalar, UpdateOutcome,
};
