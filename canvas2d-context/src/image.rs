//! Images that can be drawn onto a context.
//!
//! A [`CanvasImage`] holds a decoded premultiplied pixmap plus the source it
//! came from. Reloading with [`CanvasImage::set_src`] decodes on a background
//! thread; every request gets a generation number and only the newest one is
//! ever applied, so the last `set_src` wins regardless of completion order.

use crate::error::{Canvas2dError, Canvas2dResult};
use crate::geometry::ImageData;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use tiny_skia::{IntSize, Pixmap, PixmapRef};

/// Anything with pixels that `draw_image` can read from.
pub trait ImageSource {
    /// Premultiplied pixels, or `None` when there is nothing to draw.
    fn pixmap_ref(&self) -> Option<PixmapRef<'_>>;
}

impl ImageSource for Pixmap {
    fn pixmap_ref(&self) -> Option<PixmapRef<'_>> {
        Some(self.as_ref())
    }
}

/// Completion of a background load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEvent {
    Loaded { width: u32, height: u32 },
    Failed { src: String, message: String },
}

struct LoadOutcome {
    generation: u64,
    result: Canvas2dResult<Pixmap>,
}

/// A decoded image with an optional in-flight reload.
pub struct CanvasImage {
    src: String,
    pixmap: Option<Pixmap>,
    generation: u64,
    loading: bool,
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
}

impl Default for CanvasImage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CanvasImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasImage")
            .field("src", &self.src)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl CanvasImage {
    /// An empty image (0x0, no source).
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            src: String::new(),
            pixmap: None,
            generation: 0,
            loading: false,
            sender,
            receiver,
        }
    }

    /// Load `src` synchronously. This blocks on file IO and decoding.
    ///
    /// A failed load yields an empty image and logs a warning.
    pub fn open(src: &str) -> Self {
        let mut image = Self::new();
        image.src = src.to_string();
        match load_file(src) {
            Ok(pixmap) => image.pixmap = Some(pixmap),
            Err(err) => log::warn!(target: "canvas", "{}", err),
        }
        image
    }

    /// Wrap an existing premultiplied pixmap.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        let mut image = Self::new();
        image.pixmap = Some(pixmap);
        image
    }

    /// Build from straight-alpha RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, data: &[u8]) -> Canvas2dResult<Self> {
        let pixmap = pixmap_from_rgba(width, height, data).ok_or_else(|| {
            Canvas2dError::InvalidArgument(format!(
                "{} bytes of RGBA do not form a {}x{} image",
                data.len(),
                width,
                height
            ))
        })?;
        Ok(Self::from_pixmap(pixmap))
    }

    /// Decode PNG or JPEG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Canvas2dResult<Self> {
        let pixmap = decode_bytes("<memory>", bytes)?;
        Ok(Self::from_pixmap(pixmap))
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn width(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, |p| p.width())
    }

    pub fn height(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, |p| p.height())
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Straight-alpha copy of the pixels. Empty when nothing is loaded.
    pub fn data(&self) -> ImageData {
        match &self.pixmap {
            Some(pixmap) => {
                let mut data = vec![0u8; pixmap.data().len()];
                unpremultiply_into(pixmap.data(), &mut data);
                ImageData {
                    width: pixmap.width(),
                    height: pixmap.height(),
                    data,
                }
            }
            None => ImageData::new(0, 0),
        }
    }

    /// Whether a background load for the current source is still running.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start loading `src` in the background.
    ///
    /// The previous pixels stay visible until the load completes and is
    /// picked up by [`poll`](Self::poll) or [`wait_for_load`](Self::wait_for_load).
    pub fn set_src(&mut self, src: &str) {
        self.generation += 1;
        self.src = src.to_string();
        self.loading = true;
        log::debug!(target: "canvas", "image load #{} '{}'", self.generation, src);

        let generation = self.generation;
        let sender = self.sender.clone();
        let src = src.to_string();
        std::thread::spawn(move || {
            let result = load_file(&src);
            // The image may have been dropped in the meantime.
            let _ = sender.send(LoadOutcome { generation, result });
        });
    }

    /// Apply a finished load without blocking.
    pub fn poll(&mut self) -> Option<ImageEvent> {
        while let Ok(outcome) = self.receiver.try_recv() {
            if let Some(event) = self.apply(outcome) {
                return Some(event);
            }
        }
        None
    }

    /// Block until the latest requested load finishes or `timeout` elapses.
    pub fn wait_for_load(&mut self, timeout: Duration) -> Option<ImageEvent> {
        if !self.loading {
            return None;
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(outcome) => {
                    if let Some(event) = self.apply(outcome) {
                        return Some(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }

    fn apply(&mut self, outcome: LoadOutcome) -> Option<ImageEvent> {
        if outcome.generation != self.generation {
            log::debug!(target: "canvas", "discarding stale image load #{}", outcome.generation);
            return None;
        }
        self.loading = false;
        match outcome.result {
            Ok(pixmap) => {
                let event = ImageEvent::Loaded {
                    width: pixmap.width(),
                    height: pixmap.height(),
                };
                self.pixmap = Some(pixmap);
                Some(event)
            }
            Err(err) => {
                log::warn!(target: "canvas", "{}", err);
                self.pixmap = None;
                Some(ImageEvent::Failed {
                    src: self.src.clone(),
                    message: err.to_string(),
                })
            }
        }
    }
}

impl ImageSource for CanvasImage {
    fn pixmap_ref(&self) -> Option<PixmapRef<'_>> {
        self.pixmap.as_ref().map(|p| p.as_ref())
    }
}

fn load_file(src: &str) -> Canvas2dResult<Pixmap> {
    let bytes = std::fs::read(src).map_err(|e| Canvas2dError::ImageLoad {
        src: src.to_string(),
        message: e.to_string(),
    })?;
    decode_bytes(src, &bytes)
}

fn decode_bytes(src: &str, bytes: &[u8]) -> Canvas2dResult<Pixmap> {
    let img = ::image::load_from_memory(bytes).map_err(|e| Canvas2dError::ImageLoad {
        src: src.to_string(),
        message: e.to_string(),
    })?;
    let rgba = img.to_rgba8();
    pixmap_from_rgba(rgba.width(), rgba.height(), rgba.as_raw()).ok_or_else(|| {
        Canvas2dError::ImageLoad {
            src: src.to_string(),
            message: "decoded image has zero size".to_string(),
        }
    })
}

/// Premultiply straight-alpha RGBA into a new pixmap.
pub(crate) fn pixmap_from_rgba(width: u32, height: u32, data: &[u8]) -> Option<Pixmap> {
    let size = IntSize::from_wh(width, height)?;
    if data.len() != width as usize * height as usize * 4 {
        return None;
    }
    let mut premultiplied = vec![0u8; data.len()];
    premultiply_into(data, &mut premultiplied);
    Pixmap::from_vec(premultiplied, size)
}

pub(crate) fn premultiply_into(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = s[3] as u32;
        d[0] = ((s[0] as u32 * a + 127) / 255) as u8;
        d[1] = ((s[1] as u32 * a + 127) / 255) as u8;
        d[2] = ((s[2] as u32 * a + 127) / 255) as u8;
        d[3] = s[3];
    }
}

/// Undo premultiplication, rounding to nearest so a later premultiply
/// reproduces the original bytes.
pub(crate) fn unpremultiply_into(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = s[3] as u32;
        if a == 0 {
            d.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for c in 0..3 {
            d[c] = ((s[c] as u32 * 255 + a / 2) / a).min(255) as u8;
        }
        d[3] = s[3];
    }
}
