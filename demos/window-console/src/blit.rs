//! Software back buffer blitted to a winit window through softbuffer.

use std::{
    num::NonZeroU32,
    rc::Rc,
    time::{Duration, Instant},
};

use rogueterm_core::{Color, Error, GlyphBitmap, PixelImage, PixelRect, PixelSurface, Surface};
use winit::window::Window;

type WindowTarget = (softbuffer::Context<Rc<Window>>, softbuffer::Surface<Rc<Window>, Rc<Window>>);

/// [`Surface`] drawing into a [`PixelSurface`] and copying each finished
/// frame to the window.
///
/// With a frame budget, `present` sleeps out the rest of the budget so the
/// console loop itself never blocks on input.
pub struct SoftbufferSurface {
    frame: PixelSurface,
    target: Option<WindowTarget>,
    window: Option<Rc<Window>>,
    frame_budget: Option<Duration>,
    last_present: Instant,
}

impl SoftbufferSurface {
    /// # Errors
    /// Fails if softbuffer cannot attach to the window's display.
    pub fn new(window: Rc<Window>, frame_budget: Option<Duration>) -> Result<Self, Error> {
        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| Error::surface_creation_failed(&e.to_string()))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| Error::surface_creation_failed(&e.to_string()))?;

        let size = window.inner_size();
        tracing::debug!(width = size.width, height = size.height, "attached softbuffer surface");

        Ok(Self {
            frame: PixelSurface::new(size.width, size.height),
            target: Some((context, surface)),
            window: Some(window),
            frame_budget,
            last_present: Instant::now(),
        })
    }

    fn blit(&mut self) -> Result<(), Error> {
        let (width, height) = self.frame.pixel_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height))
        else {
            // minimized
            return Ok(());
        };
        let Some((_, surface)) = self.target.as_mut() else { return Ok(()) };

        surface
            .resize(width, height)
            .map_err(|e| Error::present_failed(&e.to_string()))?;
        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| Error::present_failed(&e.to_string()))?;
        buffer.copy_from_slice(self.frame.pixels());
        buffer
            .present()
            .map_err(|e| Error::present_failed(&e.to_string()))
    }

    fn pace(&mut self) {
        if let Some(budget) = self.frame_budget {
            let elapsed = self.last_present.elapsed();
            if elapsed < budget {
                std::thread::sleep(budget - elapsed);
            }
        }
        self.last_present = Instant::now();
    }
}

impl Surface for SoftbufferSurface {
    type Image = PixelImage;

    fn pixel_size(&self) -> (u32, u32) {
        self.frame.pixel_size()
    }

    fn set_draw_color(&mut self, color: Color) {
        self.frame.set_draw_color(color);
    }

    fn clear(&mut self) {
        if let Some(window) = &self.window {
            let size = window.inner_size();
            self.frame.resize(size.width, size.height);
        }
        self.frame.clear();
    }

    fn fill_rect(&mut self, rect: PixelRect) {
        self.frame.fill_rect(rect);
    }

    fn copy_image(&mut self, image: &PixelImage, dst: PixelRect) {
        self.frame.copy_image(image, dst);
    }

    fn present(&mut self) -> Result<(), Error> {
        self.blit()?;
        self.frame.present()?;
        self.pace();
        Ok(())
    }

    fn create_image(&mut self, bitmap: &GlyphBitmap) -> Result<PixelImage, Error> {
        self.frame.create_image(bitmap)
    }

    fn destroy_image(&mut self, image: PixelImage) {
        self.frame.destroy_image(image);
    }

    fn set_title(&mut self, title: &str) {
        self.frame.set_title(title);
        if let Some(window) = &self.window {
            window.set_title(title);
        }
    }

    fn release(&mut self) {
        if self.target.take().is_some() {
            tracing::debug!(frames = self.frame.frames_presented(), "released softbuffer surface");
        }
        self.window = None;
    }
}
