pub mod events;
pub mod keyed_lock;
pub mod repository;

pub use events::{DataUpdate, DataUpdateBus};
pub use keyed_lock::KeyedLock;
pub use repository::CareInstanceRepository;
