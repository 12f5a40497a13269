pub mod json_store;
pub mod progress;
pub mod schema;

pub use progress::{Persistence, ProgressStore, StoreEvent};
