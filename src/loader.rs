use crate::disk_io::DiskLoadThread;
use crate::hashing::HashMap;
use crate::progress::ProgressTracker;
use crate::storage::LoadableImage;
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a requested image's bytes come from.
#[derive(Clone, Debug)]
pub enum LoadSource {
    Disk(PathBuf),
    Remote(String),
}

/// A single in-flight load. Created at submission time, copied into
/// whichever queue accepts it, and destroyed once the poll step finalizes
/// it (or immediately, if the load fails before reaching the completion
/// queue).
#[derive(Clone)]
pub struct LoadRequest {
    pub image: Arc<dyn LoadableImage>,
    pub source: LoadSource,
    /// For disk loads this is the path itself; for remote loads it is a
    /// generated correlation name used to match the fetch response back to
    /// this request.
    pub name: String,
}

impl std::fmt::Debug for LoadRequest {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoadRequest")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

/// A completed or failed fetch as delivered by the transport layer. The
/// transport delivers exactly one response per request, on the polling
/// thread.
#[derive(Debug)]
pub struct FetchResponse {
    pub correlation_name: String,
    pub status: u16,
    pub data: Vec<u8>,
}

/// External transport that performs URL fetches on the loader's behalf.
pub trait UrlTransport: Send + Sync {
    /// Begins an async fetch tagged with the given correlation name.
    /// Fire-and-forget; the result arrives later as a [`FetchResponse`].
    fn fetch_async(
        &self,
        url: &str,
        correlation_name: &str,
    );

    /// Releases any resources the transport still holds for a failed
    /// request.
    fn release_request(
        &self,
        correlation_name: &str,
    );
}

/// The image acquisition pipeline.
///
/// Two threads of control touch this system: the disk worker (owned by the
/// loader, decodes from storage) and the polling/owner thread, which calls
/// everything on this type. Submission, [`handle_url_response`] and
/// [`update`] are expected to run on the same thread so the fetch registry
/// needs no lock; only the progress counters are shared across threads.
///
/// Dropping the loader closes the disk queue and joins the worker, so no
/// decode is ever in flight against a torn-down target image.
///
/// [`handle_url_response`]: ImageLoader::handle_url_response
/// [`update`]: ImageLoader::update
pub struct ImageLoader {
    // Closed by taking the sender; the worker drains and exits
    disk_tx: Option<Sender<LoadRequest>>,
    completed_tx: Sender<LoadRequest>,
    completed_rx: Receiver<LoadRequest>,
    worker: Option<DiskLoadThread>,

    // Remote requests waiting on a fetch response, keyed by correlation
    // name. Touched only on the polling thread.
    pending_fetches: HashMap<String, LoadRequest>,
    transport: Arc<dyn UrlTransport>,

    // Bumped once per submission, disk or remote; remote correlation names
    // are generated from it
    next_id: u64,
    progress: Arc<ProgressTracker>,
}

impl ImageLoader {
    pub fn new(transport: Arc<dyn UrlTransport>) -> Self {
        let (disk_tx, disk_rx) = crossbeam_channel::unbounded();
        let (completed_tx, completed_rx) = crossbeam_channel::unbounded();
        let worker = DiskLoadThread::new(disk_rx, completed_tx.clone());

        ImageLoader {
            disk_tx: Some(disk_tx),
            completed_tx,
            completed_rx,
            worker: Some(worker),
            pending_fetches: Default::default(),
            transport,
            next_id: 0,
            progress: Arc::new(ProgressTracker::default()),
        }
    }

    /// Queues an image to be decoded from local storage on the worker
    /// thread. Returns immediately; the image is finalized by a later
    /// [`update`](ImageLoader::update) call once the decode completes.
    pub fn load_from_disk(
        &mut self,
        image: Arc<dyn LoadableImage>,
        path: impl Into<PathBuf>,
    ) {
        let Some(disk_tx) = &self.disk_tx else {
            log::error!("load_from_disk called after shutdown, dropping request");
            return;
        };

        self.next_id += 1;
        let path = path.into();
        image.set_gpu_ready(false);
        self.progress.mark_submitted();

        let request = LoadRequest {
            name: path.to_string_lossy().into_owned(),
            source: LoadSource::Disk(path),
            image,
        };
        log::debug!("queue disk load {:?}", request);
        disk_tx.send(request).unwrap();
    }

    /// Starts an async fetch of an image through the transport layer.
    /// Returns the generated correlation name the response will carry.
    pub fn load_from_url(
        &mut self,
        image: Arc<dyn LoadableImage>,
        url: impl Into<String>,
    ) -> String {
        let url = url.into();
        self.next_id += 1;
        let name = format!("image{}", self.next_id);
        image.set_gpu_ready(false);
        self.progress.mark_submitted();

        let request = LoadRequest {
            image,
            source: LoadSource::Remote(url.clone()),
            name: name.clone(),
        };
        log::debug!("begin async fetch {:?}", request);
        self.pending_fetches.insert(name.clone(), request);
        self.transport.fetch_async(&url, &name);
        name
    }

    /// Handles a fetch response from the transport layer. Runs inline on
    /// the polling thread's event dispatch and must not block.
    ///
    /// Whatever the outcome, a found registry entry is removed, so the
    /// registry never leaks resolved requests.
    pub fn handle_url_response(
        &mut self,
        response: FetchResponse,
    ) {
        let entry = self.pending_fetches.remove(&response.correlation_name);
        if response.status == 200 {
            if let Some(request) = entry {
                if request.image.load_from_memory(&response.data) {
                    self.completed_tx.send(request).unwrap();
                } else {
                    // Resolved but never finalized; decode failures here are
                    // not surfaced beyond the log
                    log::error!(
                        "couldn't decode fetched data for {:?}",
                        response.correlation_name
                    );
                }
            } else {
                log::debug!(
                    "fetch response for unknown request {:?}",
                    response.correlation_name
                );
            }
        } else {
            log::error!("couldn't load url, response status: {}", response.status);
            self.transport.release_request(&response.correlation_name);
        }
    }

    /// The per-tick poll step. Drains at most one completed load per call
    /// so finalization never holds the driving thread for more than one
    /// image's cost per tick. Never blocks; an empty queue is a no-op.
    #[profiling::function]
    pub fn update(&mut self) {
        if let Ok(request) = self.completed_rx.try_recv() {
            log::debug!("finalize {:?}", request);
            request.image.set_gpu_ready(true);
            request.image.update();
            self.progress.mark_finalized();
        }
    }

    /// Fraction of submitted work finalized since the loader was last
    /// idle, 1.0 when idle.
    pub fn progress(&self) -> f32 {
        self.progress.progress()
    }

    /// Shared handle to the progress counters, readable from any thread.
    pub fn progress_tracker(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    /// Number of remote requests still waiting on a fetch response.
    pub fn pending_fetch_count(&self) -> usize {
        self.pending_fetches.len()
    }

    /// Returns true if a remote request with this correlation name has been
    /// submitted and not yet resolved by a fetch response.
    pub fn is_fetch_pending(
        &self,
        name: &str,
    ) -> bool {
        self.pending_fetches.contains_key(name)
    }

    /// Closes the disk queue and joins the worker thread. The worker drains
    /// anything still buffered before exiting. Idempotent; also runs on
    /// drop.
    pub fn shutdown(&mut self) {
        self.disk_tx = None;
        if let Some(worker) = self.worker.take() {
            worker.join();
        }
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}
