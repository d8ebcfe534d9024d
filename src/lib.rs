//! Threaded image acquisition with deferred GPU binding.
//!
//! Images are decoded off the GPU-owning thread: disk loads run on a
//! dedicated worker thread, URL loads go through the host's async transport.
//! Completed decodes come back over a completion queue that the host drains
//! one item per tick, so texture binding never stalls the driving thread.

mod disk_io;
pub mod hashing;
pub mod loader;
pub mod progress;
pub mod storage;

pub use crate::loader::{FetchResponse, ImageLoader, LoadRequest, LoadSource, UrlTransport};
pub use crate::progress::ProgressTracker;
pub use crate::storage::LoadableImage;
