//! Image placeholders and the collaborators that fill them.
//!
//! The renderer never waits for an image. For every image it inserts a
//! placeholder attachment backed by an [`ImageSlot`] and hands the slot to
//! the configured [`ImageResolver`]. The resolver may fill the slot before
//! returning or from any other thread later on; in the latter case it must
//! call [`LayoutNotifier::invalidate`] so the host view re-lays out the text.
//!
//! Callback-style loaders implement [`ImageFetcher`] instead and are adapted
//! with [`CallbackResolver`], which fills the slot and invalidates layout on
//! their behalf.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Intrinsic size of a resolved image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImageBounds {
    pub width: f32,
    pub height: f32,
}

/// Decoded image content delivered by a resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedImage {
    /// Encoded image bytes (PNG, JPEG, ...).
    pub bytes: Vec<u8>,
    pub bounds: ImageBounds,
}

#[derive(Default)]
struct SlotState {
    image: Mutex<Option<ResolvedImage>>,
    filled: Condvar,
}

/// Shared placeholder for an image that may be resolved later.
///
/// Cloning yields another handle to the same slot. Filling a slot whose
/// document has been dropped is harmless.
#[derive(Clone, Default)]
pub struct ImageSlot {
    state: Arc<SlotState>,
}

impl ImageSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the resolved image and wake any waiters.
    pub fn fill(&self, image: ResolvedImage) {
        let mut guard = self
            .state
            .image
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(image);
        self.state.filled.notify_all();
    }

    /// Current content, `None` while unresolved.
    #[must_use]
    pub fn get(&self) -> Option<ResolvedImage> {
        self.state
            .image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the slot has been filled.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state
            .image
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Block up to `timeout` for the slot to be filled.
    ///
    /// Intended for hosts and tests; the renderer itself never waits.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ResolvedImage> {
        let guard = self
            .state
            .image
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .state
            .filled
            .wait_timeout_while(guard, timeout, |image| image.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }
}

impl fmt::Debug for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSlot")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Host callback told which attachment needs a new layout pass.
pub type LayoutCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Explicit layout invalidation hook for one attachment.
#[derive(Clone, Default)]
pub struct LayoutNotifier {
    attachment: usize,
    callback: Option<LayoutCallback>,
}

impl LayoutNotifier {
    /// Notifier that forwards to `callback`.
    #[must_use]
    pub fn new(attachment: usize, callback: Option<LayoutCallback>) -> Self {
        Self {
            attachment,
            callback,
        }
    }

    /// Tell the host view the attachment changed size.
    pub fn invalidate(&self) {
        if let Some(callback) = &self.callback {
            callback(self.attachment);
        }
    }
}

impl fmt::Debug for LayoutNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutNotifier")
            .field("attachment", &self.attachment)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Everything a resolver needs to load one image.
#[derive(Clone, Debug)]
pub struct ImageRequest {
    /// Index of the attachment in the rendered document.
    pub attachment: usize,
    /// Image source exactly as written in the document.
    pub url: String,
    pub title: Option<String>,
    pub layout: LayoutNotifier,
}

/// Loader that fills placeholders in place.
///
/// Called once per image during rendering; must not block.
pub trait ImageResolver: Send + Sync {
    /// Start resolving `request` into `slot`.
    fn resolve(&self, request: ImageRequest, slot: ImageSlot);
}

/// Completion callback for [`ImageFetcher`]. `None` leaves the image blank.
pub type FetchCallback = Box<dyn FnOnce(Option<ResolvedImage>) + Send>;

/// Loader that reports results through a callback.
pub trait ImageFetcher: Send + Sync {
    /// Start fetching `url`; `done` may run on any thread.
    fn fetch(&self, url: &str, done: FetchCallback);
}

/// Adapts an [`ImageFetcher`] into an [`ImageResolver`].
#[derive(Debug)]
pub struct CallbackResolver<F> {
    fetcher: F,
}

impl<F: ImageFetcher> CallbackResolver<F> {
    /// Wrap `fetcher`.
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

impl<F: ImageFetcher> ImageResolver for CallbackResolver<F> {
    fn resolve(&self, request: ImageRequest, slot: ImageSlot) {
        let ImageRequest { url, layout, .. } = request;
        let done_url = url.clone();
        self.fetcher.fetch(
            &url,
            Box::new(move |result| match result {
                Some(image) => {
                    slot.fill(image);
                    layout.invalidate();
                }
                None => tracing::debug!(url = %done_url, "image left unresolved"),
            }),
        );
    }
}
