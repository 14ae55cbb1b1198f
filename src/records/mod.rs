// Record normalization — raw roster and publication rows into typed records.

pub mod ids;
pub mod models;
pub mod publications;
pub mod roster;
