//! State module for seeds and harvested records
//!
//! # Components
//!
//! - `SeedStatus`: lifecycle of a seed across runs (pending, done, failed)
//! - `Seed`: a listing URL to be paginated
//! - `Record`: one extracted quote

mod record;
mod seed_status;

pub use record::{Record, Seed};
pub use seed_status::SeedStatus;
