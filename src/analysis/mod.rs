pub mod filter;
pub mod queues;
pub mod summary;
