pub mod aws;
pub mod deadline;
pub mod memory;
pub mod s3_client;
pub mod store;

pub use aws::S3Store;
pub use deadline::DeadlineStore;
pub use memory::MemoryStore;
pub use store::{ListQuery, ObjectPage, ObjectStore, ObjectSummary, StoreError, StoreResult};
