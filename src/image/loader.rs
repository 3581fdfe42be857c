//! Asynchronous image loading with a single-consumer notification queue.
//!
//! Providers run either inline or on worker threads. Every state change is
//! pushed to a shared queue as an [`ImageNotification`]; the pipeline drains
//! the queue on the render thread at the start of the next frame, so no
//! notification ever re-enters layout or paint.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use super::{ImageError, ImageLoadPayload, ImageProvider};
use crate::tree::NodeId;

/// Identifies the request an event answers: the image node plus the
/// node's image generation at the time of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTicket {
    pub node: NodeId,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub ticket: ImageTicket,
    pub provider: Arc<dyn ImageProvider>,
}

#[derive(Debug, Clone)]
pub enum ImageEvent {
    Started,
    Progress { loaded: u64, total: Option<u64> },
    Loaded(ImageLoadPayload),
    Failed(Arc<ImageError>),
}

#[derive(Debug, Clone)]
pub struct ImageNotification {
    pub ticket: ImageTicket,
    pub event: ImageEvent,
}

/// Observer of image notifications, called on the render thread before
/// each notification reaches its node.
pub trait ImageLifecycle {
    fn on_event(&mut self, ticket: ImageTicket, event: &ImageEvent);
}

type Queue = Arc<Mutex<Vec<ImageNotification>>>;
type Cache = Arc<Mutex<HashMap<String, ImageLoadPayload>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs image providers and queues their notifications.
pub struct ImageLoader {
    background: bool,
    queue: Queue,
    cache: Cache,
    in_flight: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl ImageLoader {
    /// With `background`, providers run on worker threads; otherwise
    /// [`submit`](Self::submit) loads before returning.
    pub fn new(background: bool) -> Self {
        Self {
            background,
            queue: Arc::new(Mutex::new(Vec::new())),
            cache: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            workers: Vec::new(),
        }
    }

    pub fn submit(&mut self, request: ImageRequest) {
        let ImageRequest { ticket, provider } = request;
        let key = provider.key();

        push(&self.queue, ticket, ImageEvent::Started);

        if let Some(payload) = lock(&self.cache).get(&key).cloned() {
            log::trace!("image cache hit for {key}");
            push(&self.queue, ticket, ImageEvent::Loaded(payload));
            return;
        }

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let queue = Arc::clone(&self.queue);
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);
        let job = move || {
            run_load(provider.as_ref(), key, ticket, &queue, &cache);
            in_flight.fetch_sub(1, Ordering::SeqCst);
        };

        if self.background {
            self.workers.retain(|worker| !worker.is_finished());
            self.workers.push(std::thread::spawn(job));
        } else {
            job();
        }
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&self) -> Vec<ImageNotification> {
        std::mem::take(&mut *lock(&self.queue))
    }

    pub fn has_pending(&self) -> bool {
        !lock(&self.queue).is_empty()
    }

    /// Loads that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Block until every worker thread has finished.
    pub fn wait_idle(&mut self) {
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("image worker panicked");
            }
        }
    }

    pub fn cached(&self, key: &str) -> Option<ImageLoadPayload> {
        lock(&self.cache).get(key).cloned()
    }

    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLoader")
            .field("background", &self.background)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

fn push(queue: &Mutex<Vec<ImageNotification>>, ticket: ImageTicket, event: ImageEvent) {
    lock(queue).push(ImageNotification { ticket, event });
}

fn run_load(
    provider: &dyn ImageProvider,
    key: String,
    ticket: ImageTicket,
    queue: &Mutex<Vec<ImageNotification>>,
    cache: &Mutex<HashMap<String, ImageLoadPayload>>,
) {
    let mut report = |loaded: u64, total: Option<u64>| push(queue, ticket, ImageEvent::Progress { loaded, total });

    match provider.load(&mut report) {
        Ok(payload) => {
            log::debug!("loaded image {key} ({}x{})", payload.size.width, payload.size.height);
            lock(cache).insert(key, payload.clone());
            push(queue, ticket, ImageEvent::Loaded(payload));
        }
        Err(error) => {
            log::warn!("failed to load image {key}: {error}");
            push(queue, ticket, ImageEvent::Failed(Arc::new(error)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageHandle, MemoryImageProvider, ProgressFn};
    use crate::layout::Size;

    #[derive(Debug)]
    struct Solid;

    impl ImageProvider for Solid {
        fn key(&self) -> String {
            "solid".into()
        }

        fn load(&self, progress: ProgressFn<'_>) -> Result<ImageLoadPayload, ImageError> {
            progress(1, Some(1));
            Ok(ImageLoadPayload::new(ImageHandle::new(image::RgbaImage::new(4, 2))))
        }
    }

    fn ticket() -> ImageTicket {
        ImageTicket {
            node: NodeId::new(0, 0),
            generation: 1,
        }
    }

    #[test]
    fn test_inline_load_queues_lifecycle() {
        let mut loader = ImageLoader::new(false);
        loader.submit(ImageRequest {
            ticket: ticket(),
            provider: Arc::new(Solid),
        });

        let events: Vec<_> = loader.drain().into_iter().map(|n| n.event).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ImageEvent::Started));
        assert!(matches!(events[1], ImageEvent::Progress { loaded: 1, total: Some(1) }));
        let ImageEvent::Loaded(payload) = &events[2] else {
            panic!("expected Loaded, got {:?}", events[2]);
        };
        assert_eq!(payload.size, Size::new(4.0, 2.0));
        assert!(!loader.has_pending());
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn test_second_request_hits_cache() {
        let mut loader = ImageLoader::new(false);
        for _ in 0..2 {
            loader.submit(ImageRequest {
                ticket: ticket(),
                provider: Arc::new(Solid),
            });
        }
        let events: Vec<_> = loader.drain().into_iter().map(|n| n.event).collect();
        // Started, Progress, Loaded, then Started, Loaded from the cache
        assert_eq!(events.len(), 5);
        assert!(loader.cached("solid").is_some());
    }

    #[test]
    fn test_failure_is_queued_not_raised() {
        let mut loader = ImageLoader::new(false);
        loader.submit(ImageRequest {
            ticket: ticket(),
            provider: Arc::new(MemoryImageProvider::new("bad", vec![0u8; 4])),
        });
        let last = loader.drain().pop().map(|n| n.event);
        assert!(matches!(last, Some(ImageEvent::Failed(_))));
    }

    #[test]
    fn test_background_load_completes() {
        let mut loader = ImageLoader::new(true);
        loader.submit(ImageRequest {
            ticket: ticket(),
            provider: Arc::new(Solid),
        });
        loader.wait_idle();
        assert_eq!(loader.in_flight(), 0);
        assert!(loader
            .drain()
            .iter()
            .any(|n| matches!(n.event, ImageEvent::Loaded(_))));
    }
}
