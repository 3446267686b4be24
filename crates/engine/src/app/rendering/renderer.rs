use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::debug;
use winit::window::Window;

use super::FrameCanvas;
use crate::world::Settings;

/// Window-backed framebuffer. The buffer matches the world size and `pixels`
/// scales it onto the window surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, buffer_width: u32, buffer_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let buffer_width = buffer_width.max(1);
        let buffer_height = buffer_height.max(1);
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            size.width.max(1),
            size.height.max(1),
            buffer_width,
            buffer_height,
        )?;
        Ok(Self {
            window,
            pixels,
            buffer_width,
            buffer_height,
        })
    }

    pub fn buffer_size(&self) -> (u32, u32) {
        (self.buffer_width, self.buffer_height)
    }

    /// Rebuilds the surface for a new window size. Zero sizes (minimized) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            width,
            height,
            self.buffer_width,
            self.buffer_height,
        )?;
        Ok(())
    }

    /// Matches the framebuffer to the world after a level with different
    /// settings is loaded.
    pub fn set_world_size(&mut self, settings: &Settings) -> Result<(), Error> {
        let (buffer_width, buffer_height) = buffer_dimensions(settings);
        if (buffer_width, buffer_height) == self.buffer_size() {
            return Ok(());
        }
        self.buffer_width = buffer_width;
        self.buffer_height = buffer_height;
        let size = self.window.inner_size();
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            size.width.max(1),
            size.height.max(1),
            buffer_width,
            buffer_height,
        )?;
        debug!(buffer_width, buffer_height, "framebuffer_resized");
        Ok(())
    }

    pub fn canvas(&mut self) -> FrameCanvas<'_> {
        let (width, height) = (self.buffer_width, self.buffer_height);
        FrameCanvas::new(self.pixels.frame_mut(), width, height)
    }

    pub fn present(&self) -> Result<(), Error> {
        self.pixels.render()
    }

    fn build_pixels(
        window: Arc<Window>,
        surface_width: u32,
        surface_height: u32,
        buffer_width: u32,
        buffer_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(buffer_width, buffer_height, surface)
    }
}

/// Framebuffer size for a world, at least one pixel on each axis.
pub(crate) fn buffer_dimensions(settings: &Settings) -> (u32, u32) {
    (to_extent(settings.width), to_extent(settings.height))
}

fn to_extent(value: f64) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        1
    }
}
