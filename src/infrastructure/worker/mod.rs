//! Worker Layer - Background Task Processing

mod generate_worker;

pub use generate_worker::{GenerateWorker, GenerateWorkerConfig};
