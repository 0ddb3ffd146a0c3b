pub mod error;
pub mod fallback;
pub mod file;
pub mod keys;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use fallback::read_with_fallback;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
