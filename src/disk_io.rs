use crate::loader::{LoadRequest, LoadSource};
use crossbeam_channel::{Receiver, Sender};
use std::thread::JoinHandle;

// Thread that drains the disk load queue and ends when the queue is closed
pub(crate) struct DiskLoadThread {
    join_handle: JoinHandle<()>,
}

impl DiskLoadThread {
    pub(crate) fn new(
        request_rx: Receiver<LoadRequest>,
        completed_tx: Sender<LoadRequest>,
    ) -> Self {
        let join_handle = std::thread::Builder::new()
            .name("Image Load Thread".into())
            .spawn(move || {
                profiling::register_thread!("DiskLoadThread");
                while let Ok(request) = request_rx.recv() {
                    profiling::scope!("decode from storage");
                    match &request.source {
                        LoadSource::Disk(path) => {
                            log::trace!("start disk load {:?}", path);
                            if request.image.load_from_path(path) {
                                completed_tx.send(request).unwrap();
                            } else {
                                // Failed decodes are dropped and never finalized
                                log::error!("couldn't load file: {:?}", path);
                            }
                        }
                        LoadSource::Remote(url) => {
                            // Remote requests resolve through the fetch
                            // registry and never travel through this queue
                            log::error!("remote request {:?} on the disk queue, dropping", url);
                        }
                    }
                }
                log::trace!("finishing image load thread on closed queue");
            })
            .unwrap();

        DiskLoadThread { join_handle }
    }

    pub(crate) fn join(self) {
        self.join_handle.join().unwrap();
    }
}
