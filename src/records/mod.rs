mod client;
#[cfg(test)]
pub mod fake;
mod types;

pub use client::{RecordClient, RecordStore};
pub use types::{parse_age, Collection, LearningPace, LearningPathway, UserRecord};
