mod store;
mod types;

pub use store::{CacheHandler, CacheHandlerBuilder};
pub use types::Record;
