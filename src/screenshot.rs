use anyhow::anyhow;
use image::RgbaImage;
use std::borrow::Cow;

pub type CaptureFn = Box<dyn FnMut() -> anyhow::Result<RgbaImage>>;

/// Grab the primary display.
#[cfg(windows)]
pub fn capture_primary_screen() -> anyhow::Result<RgbaImage> {
    let screen = screenshots::Screen::from_point(0, 0)?;
    Ok(screen.capture()?)
}

#[cfg(not(windows))]
pub fn capture_primary_screen() -> anyhow::Result<RgbaImage> {
    Err(anyhow!("screen capture is not supported on this platform"))
}

/// The image shown by the screenshot panel.
///
/// A fresh capture is taken each time the panel opens, before it is drawn,
/// and dropped when the panel closes.
pub struct ScreenshotSession {
    capture: CaptureFn,
    image: Option<RgbaImage>,
    generation: u64,
}

impl ScreenshotSession {
    pub fn new(capture: CaptureFn) -> Self {
        Self {
            capture,
            image: None,
            generation: 0,
        }
    }

    pub fn primary_screen() -> Self {
        Self::new(Box::new(capture_primary_screen))
    }

    /// Follow the panel's visibility: capture on open, release on close.
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.capture();
        } else {
            self.release();
        }
    }

    pub fn capture(&mut self) {
        self.release();
        match (self.capture)() {
            Ok(image) => {
                tracing::debug!(width = image.width(), height = image.height(), "screenshot captured");
                self.image = Some(image);
                self.generation += 1;
            }
            Err(err) => tracing::error!(?err, "failed to capture screenshot"),
        }
    }

    pub fn release(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Bumped on every successful capture; lets the UI know its texture is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clipboard_image(&self) -> anyhow::Result<arboard::ImageData<'_>> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| anyhow!("no screenshot captured"))?;
        Ok(arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: Cow::Borrowed(image.as_raw()),
        })
    }

    pub fn copy_to_clipboard(&self) -> anyhow::Result<()> {
        let data = self.clipboard_image()?;
        let mut cb = arboard::Clipboard::new()?;
        cb.set_image(data)?;
        Ok(())
    }
}
