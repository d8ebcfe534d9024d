use std::path::Path;

/// A caller-owned image that the loader schedules decode and finalize work
/// on. The loader never owns the image's memory, it only invokes these
/// hooks at the right times on the right threads.
///
/// `load_from_path` is called from the disk worker thread, so
/// implementations must be safe to decode off the polling thread. Decoding
/// from fetched bytes and all GPU-ready transitions happen on the polling
/// thread.
pub trait LoadableImage: Send + Sync {
    /// Decodes the image from a file on local storage. Returns false if the
    /// file could not be read or decoded.
    fn load_from_path(
        &self,
        path: &Path,
    ) -> bool;

    /// Decodes the image from fetched bytes. Returns false if the payload
    /// could not be decoded.
    fn load_from_memory(
        &self,
        data: &[u8],
    ) -> bool;

    /// Enables or disables use of the image as a GPU texture. The loader
    /// disables this at submission time and re-enables it at finalization.
    fn set_gpu_ready(
        &self,
        ready: bool,
    );

    /// Post-decode hook, run on the polling thread when the image is
    /// finalized. This is where texture data would be uploaded.
    fn update(&self);
}
