//! Media-source contract consumed by display objects.
//!
//! Acquisition (files, devices, streams) happens outside the frame loop. Display objects only
//! poll a [`MediaSource`] once per draw and react to [`MediaPoll`]; failures are reported as a
//! [`MediaErrorKind`], never as a panic or an error return inside the loop.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::foundation::error::{DotweaveError, DotweaveResult};
use crate::paint::pattern::ImageData;

/// Why a media source cannot produce frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum MediaErrorKind {
    /// Access was refused.
    #[error("permission denied")]
    NoPermission,
    /// The device is held by someone else.
    #[error("device in use")]
    DeviceInUse,
    /// The source went away after it was ready.
    #[error("source disconnected")]
    SourceDisconnected,
    /// No file at the given path.
    #[error("file not found")]
    FileNotFound,
    /// The source exists but cannot currently be used.
    #[error("not available")]
    NotAvailable,
    /// The format or device is not supported.
    #[error("not supported")]
    NotSupported,
}

impl MediaErrorKind {
    /// Classify an IO error.
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => Self::FileNotFound,
            ErrorKind::PermissionDenied => Self::NoPermission,
            ErrorKind::ResourceBusy => Self::DeviceInUse,
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe => {
                Self::SourceDisconnected
            }
            ErrorKind::Unsupported | ErrorKind::InvalidData => Self::NotSupported,
            _ => Self::NotAvailable,
        }
    }
}

/// Result of polling a source.
#[derive(Clone, Debug)]
pub enum MediaPoll {
    /// Not ready yet; poll again next frame.
    Pending,
    /// Current frame.
    Ready(Arc<ImageData>),
    /// The source failed.
    Failed(MediaErrorKind),
}

/// Something that yields image frames over time.
pub trait MediaSource {
    /// Frame to show at `time` (ms, runtime clock).
    fn poll(&mut self, time: f64) -> MediaPoll;
}

/// A single in-memory image, or the failure that prevented loading it.
#[derive(Clone, Debug)]
pub struct StillImage {
    state: Result<Arc<ImageData>, MediaErrorKind>,
}

impl StillImage {
    /// Ready source showing `image`.
    pub fn new(image: Arc<ImageData>) -> Self {
        Self { state: Ok(image) }
    }

    /// Source that always reports `kind`.
    pub fn failed(kind: MediaErrorKind) -> Self {
        Self { state: Err(kind) }
    }

    /// Load and decode an image file. Failures are kept and reported on poll.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                let kind = MediaErrorKind::from_io(&e);
                tracing::warn!(path = %path.display(), error = %e, ?kind, "image open failed");
                return Self::failed(kind);
            }
        };
        match decode_image(&bytes) {
            Ok(img) => Self::new(Arc::new(img)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "image decode failed");
                Self::failed(MediaErrorKind::NotSupported)
            }
        }
    }

    /// The image, if loading succeeded.
    pub fn image(&self) -> Option<&Arc<ImageData>> {
        self.state.as_ref().ok()
    }
}

impl MediaSource for StillImage {
    fn poll(&mut self, _time: f64) -> MediaPoll {
        match &self.state {
            Ok(img) => MediaPoll::Ready(Arc::clone(img)),
            Err(kind) => MediaPoll::Failed(*kind),
        }
    }
}

/// Frames shown one after another at a fixed rate, starting at the first poll.
#[derive(Clone, Debug)]
pub struct ImageSequence {
    frames: Vec<Arc<ImageData>>,
    frame_ms: f64,
    looping: bool,
    start: Option<f64>,
}

impl ImageSequence {
    /// Sequence advancing every `frame_ms`. Non-positive intervals fall back to one frame per
    /// 1000/30 ms.
    pub fn new(frames: Vec<Arc<ImageData>>, frame_ms: f64) -> Self {
        let frame_ms = if frame_ms.is_finite() && frame_ms > 0.0 {
            frame_ms
        } else {
            1000.0 / 30.0
        };
        Self {
            frames,
            frame_ms,
            looping: true,
            start: None,
        }
    }

    /// Hold the last frame instead of wrapping around.
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` without frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl MediaSource for ImageSequence {
    fn poll(&mut self, time: f64) -> MediaPoll {
        if self.frames.is_empty() {
            return MediaPoll::Failed(MediaErrorKind::NotAvailable);
        }
        let start = *self.start.get_or_insert(time);
        let step = ((time - start).max(0.0) / self.frame_ms).floor() as usize;
        let idx = if self.looping {
            step % self.frames.len()
        } else {
            step.min(self.frames.len() - 1)
        };
        MediaPoll::Ready(Arc::clone(&self.frames[idx]))
    }
}

/// Source fed from outside the frame loop through a [`MediaHandle`].
#[derive(Clone, Debug)]
pub struct SharedSource {
    slot: Arc<Mutex<MediaPoll>>,
}

/// Producer side of a [`SharedSource`]; can be moved to another thread.
#[derive(Clone, Debug)]
pub struct MediaHandle {
    slot: Arc<Mutex<MediaPoll>>,
}

impl SharedSource {
    /// Pending source plus the handle that completes it.
    pub fn new() -> (Self, MediaHandle) {
        let slot = Arc::new(Mutex::new(MediaPoll::Pending));
        (
            Self {
                slot: Arc::clone(&slot),
            },
            MediaHandle { slot },
        )
    }
}

impl MediaSource for SharedSource {
    fn poll(&mut self, _time: f64) -> MediaPoll {
        match self.slot.lock() {
            Ok(state) => state.clone(),
            Err(_) => MediaPoll::Failed(MediaErrorKind::SourceDisconnected),
        }
    }
}

impl MediaHandle {
    /// Publish a new frame.
    pub fn ready(&self, image: Arc<ImageData>) {
        self.set(MediaPoll::Ready(image));
    }

    /// Report a failure.
    pub fn fail(&self, kind: MediaErrorKind) {
        self.set(MediaPoll::Failed(kind));
    }

    fn set(&self, state: MediaPoll) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = state;
        }
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into premultiplied pixels.
pub fn decode_image(bytes: &[u8]) -> DotweaveResult<ImageData> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| DotweaveError::media(format!("decode image: {e}")))?;
    ImageData::from_image(&img.to_rgba8())
}

#[cfg(test)]
#[path = "../tests/unit/media/media.rs"]
mod tests;
