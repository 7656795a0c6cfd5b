pub mod model;
pub mod store;

pub use model::{DbReading, NewReading};
pub use store::{Store, StoreError};
