pub mod memory;
pub mod qdrant;
pub mod store;
pub mod vector;

mod error;

pub use error::Error;
pub use memory::ChatMemory;
pub use qdrant::QdrantIndex;
pub use store::DocumentStore;
pub use vector::{BoxFuture, VectorIndex, VectorMatch, VectorRecord};

pub type Result<T, E = Error> = std::result::Result<T, E>;
