//! Infrastructure adapters of the client.

pub mod http;
pub mod storage;

pub use self::{
    http::{ArcGis, HttpBackend},
    storage::{FileStorage, MemoryStorage, Storage},
};
