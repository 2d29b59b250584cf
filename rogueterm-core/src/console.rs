//! The virtual console: event pump, per-frame callback, presentation and
//! teardown.

use compact_str::CompactString;
use rogueterm_data::{
    CellBuffer, Color, ColorDepth, DepthAdapter, DepthCast, GlyphRasterizer, GridBuffer,
};

use crate::{
    config::ConsoleConfig,
    error::{CallbackError, Error},
    event::{ConsoleEvent, EventSource},
    geometry::GridGeometry,
    glyph_cache::GlyphCache,
    presenter::{FrameResources, present_frame},
    surface::Surface,
};

/// Lifecycle of a [`VirtualConsole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleState {
    Running,
    Stopped,
}

/// The native components a console drives. Each one owns its own native
/// resources and gives them up in `release`.
#[derive(Debug)]
pub struct Backend<S, E, R> {
    pub surface: S,
    pub events: E,
    pub rasterizer: R,
}

impl<S, E, R> Backend<S, E, R> {
    pub fn new(surface: S, events: E, rasterizer: R) -> Self {
        Self { surface, events, rasterizer }
    }
}

type FrameCallback<B> = dyn FnMut(&mut Frame<'_, B>) -> Result<(), CallbackError>;

/// What the per-frame callback sees: the buffer to draw into and the
/// console settings it may change for this frame.
pub struct Frame<'a, B> {
    buffer: &'a mut B,
    background: &'a mut Color,
    events: &'a dyn EventSource,
    frame_index: u64,
    stop_requested: bool,
}

impl<B: CellBuffer> Frame<'_, B> {
    pub fn buffer(&self) -> &B {
        self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut B {
        self.buffer
    }

    /// Grid size in (columns, rows).
    pub fn grid_size(&self) -> (u16, u16) {
        self.buffer.size()
    }

    pub fn background(&self) -> Color {
        *self.background
    }

    /// Sets the color the surface is cleared to, starting with this frame.
    pub fn set_background(&mut self, color: Color) {
        *self.background = color;
    }

    /// Stops the console after this frame has been presented.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    /// Zero-based index of the frame being built.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Lower-cased names of the keys currently held down.
    pub fn keys_pressed(&self) -> Vec<CompactString> {
        normalize_key_names(self.events.pressed_key_names())
    }
}

/// A character-cell console presented onto a pixel surface.
///
/// Each [`run_frame`](Self::run_frame) drains pending events, lets the frame
/// callback mutate the buffer, clears the surface to the background color,
/// draws every cell and presents. The console tears down its native
/// resources once, either from [`run`](Self::run) returning or on drop.
pub struct VirtualConsole<S, E, R, B = GridBuffer>
where
    S: Surface,
    E: EventSource,
    R: GlyphRasterizer,
    B: CellBuffer,
{
    surface: S,
    events: E,
    cache: GlyphCache<R, S::Image>,
    geometry: GridGeometry,
    buffer: B,
    background: Color,
    cast: DepthCast,
    target: Option<Box<FrameCallback<B>>>,
    state: ConsoleState,
    frames_presented: u64,
    torn_down: bool,
}

impl<S, E, R> VirtualConsole<S, E, R, GridBuffer>
where
    S: Surface,
    E: EventSource,
    R: GlyphRasterizer,
{
    /// Creates a console with a [`GridBuffer`] of `config.buffer_size`.
    ///
    /// # Errors
    /// Fails with [`Error::Resource`] or [`Error::Rasterization`] if the cell
    /// size cannot be derived; the backend is released before returning.
    pub fn new(backend: Backend<S, E, R>, config: &ConsoleConfig) -> Result<Self, Error> {
        let (cols, rows) = config.buffer_size;
        Self::with_buffer(backend, config, GridBuffer::new(cols, rows))
    }
}

impl<S, E, R, B> VirtualConsole<S, E, R, B>
where
    S: Surface,
    E: EventSource,
    R: GlyphRasterizer,
    B: CellBuffer,
{
    /// Creates a console presenting from `buffer`, resized to
    /// `config.buffer_size`.
    ///
    /// # Errors
    /// See [`VirtualConsole::new`].
    pub fn with_buffer(
        backend: Backend<S, E, R>,
        config: &ConsoleConfig,
        mut buffer: B,
    ) -> Result<Self, Error> {
        let Backend { mut surface, mut events, mut rasterizer } = backend;

        let geometry = match GridGeometry::from_rasterizer(&mut rasterizer) {
            Ok(geometry) => geometry,
            Err(err) => {
                rasterizer.release();
                surface.release();
                events.release();
                return Err(err);
            },
        };

        let (cols, rows) = config.buffer_size;
        buffer.resize(cols, rows);
        surface.set_title(&config.title);

        let (cell_width, cell_height) = geometry.cell_size();
        tracing::debug!(
            title = %config.title,
            cell_width,
            cell_height,
            cols,
            rows,
            depth = ?config.color_depth,
            "created virtual console"
        );

        Ok(Self {
            surface,
            events,
            cache: GlyphCache::new(rasterizer),
            geometry,
            buffer,
            background: config.background,
            cast: DepthCast { depth: config.color_depth, ..DepthCast::default() },
            target: None,
            state: ConsoleState::Running,
            frames_presented: 0,
            torn_down: false,
        })
    }

    /// Registers the callback invoked once per frame before drawing,
    /// replacing any previous one.
    pub fn set_target<F>(&mut self, target: F)
    where
        F: FnMut(&mut Frame<'_, B>) -> Result<(), CallbackError> + 'static,
    {
        self.target = Some(Box::new(target));
    }

    /// Runs frames until the console stops, then tears it down.
    ///
    /// # Errors
    /// Returns the error that stopped the loop: a failing callback
    /// ([`Error::Callback`]), a glyph that could not be rasterized, or a
    /// surface that refused a frame. Teardown has completed either way.
    pub fn run(&mut self) -> Result<(), Error> {
        let result = loop {
            match self.run_frame() {
                Ok(ConsoleState::Running) => {},
                Ok(ConsoleState::Stopped) => break Ok(()),
                Err(err) => break Err(err),
            }
        };

        self.shutdown();
        result
    }

    /// Runs a single iteration and returns the state afterwards. Does
    /// nothing once the console has stopped.
    ///
    /// A failing callback still gets its frame presented; the error is
    /// returned after the present and the console is stopped. Rasterization
    /// and present failures abort the frame; if the callback had already
    /// failed, its error is still the one returned.
    ///
    /// # Errors
    /// See [`VirtualConsole::run`].
    pub fn run_frame(&mut self) -> Result<ConsoleState, Error> {
        if self.state == ConsoleState::Stopped {
            return Ok(ConsoleState::Stopped);
        }

        self.pump_events();
        let callback_error = self.invoke_target();

        self.surface.set_draw_color(self.background);
        self.surface.clear();

        let resources = FrameResources {
            geometry: &self.geometry,
            cast: &self.cast,
            cache: &mut self.cache,
        };
        let presented = present_frame(&self.buffer, resources, &mut self.surface)
            .and_then(|stats| self.surface.present().map(|()| stats));
        let stats = match presented {
            Ok(stats) => stats,
            Err(err) => {
                tracing::debug!(error = %err, "frame aborted");
                self.state = ConsoleState::Stopped;
                // the callback's error wins over a frame error
                return Err(callback_error.map_or(err, Error::Callback));
            },
        };

        tracing::trace!(
            frame = self.frames_presented,
            glyphs = stats.glyphs,
            rects = stats.rects,
            cached = self.cache.len(),
            "presented frame"
        );
        self.frames_presented += 1;

        match callback_error {
            Some(err) => Err(Error::Callback(err)),
            None => Ok(self.state),
        }
    }

    /// Releases every native resource, dependents first: cached images, then
    /// the rasterizer's fonts, the surface and finally the event source that
    /// owns the window. Runs once; later calls, including the one from
    /// `Drop`, do nothing.
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.state = ConsoleState::Stopped;

        self.cache.clear(&mut self.surface);
        self.cache.release_rasterizer();
        self.surface.release();
        self.events.release();

        tracing::debug!(frames = self.frames_presented, "virtual console shut down");
    }

    /// Requests a stop; observed at the start of the next iteration.
    pub fn stop(&mut self) {
        self.state = ConsoleState::Stopped;
    }

    pub fn state(&self) -> ConsoleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ConsoleState::Running
    }

    pub fn set_title(&mut self, title: &str) {
        self.surface.set_title(title);
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub fn color_depth(&self) -> ColorDepth {
        self.cast.depth
    }

    /// Changes the depth cell colors are adapted to. Already cached glyphs
    /// stay valid: the adapted colors are part of their identity.
    pub fn set_color_depth(&mut self, depth: ColorDepth) {
        self.cast.depth = depth;
    }

    pub fn set_depth_adapter(&mut self, adapter: DepthAdapter) {
        self.cast.adapter = adapter;
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn cache(&self) -> &GlyphCache<R, S::Image> {
        &self.cache
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// Lower-cased names of the keys currently held down.
    pub fn keys_pressed(&self) -> Vec<CompactString> {
        normalize_key_names(self.events.pressed_key_names())
    }

    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    fn pump_events(&mut self) {
        while let Some(event) = self.events.poll_event() {
            match event {
                ConsoleEvent::Quit => {
                    tracing::debug!("quit requested");
                    self.state = ConsoleState::Stopped;
                },
                ConsoleEvent::Resized { width, height } => {
                    let (cols, rows) = self.geometry.on_surface_resized(width, height);
                    self.buffer.resize(cols, rows);
                    tracing::debug!(width, height, cols, rows, "surface resized");
                },
                ConsoleEvent::Other => {},
            }
        }
    }

    /// Runs the frame callback, stopping the console if it asks to or fails.
    fn invoke_target(&mut self) -> Option<CallbackError> {
        let target = self.target.as_mut()?;

        let mut frame = Frame {
            buffer: &mut self.buffer,
            background: &mut self.background,
            events: &self.events,
            frame_index: self.frames_presented,
            stop_requested: false,
        };
        let result = target(&mut frame);

        if frame.stop_requested {
            self.state = ConsoleState::Stopped;
        }

        match result {
            Ok(()) => None,
            Err(err) => {
                tracing::debug!(error = %err, "frame callback failed");
                self.state = ConsoleState::Stopped;
                Some(err)
            },
        }
    }
}

impl<S, E, R, B> Drop for VirtualConsole<S, E, R, B>
where
    S: Surface,
    E: EventSource,
    R: GlyphRasterizer,
    B: CellBuffer,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S, E, R, B> std::fmt::Debug for VirtualConsole<S, E, R, B>
where
    S: Surface,
    E: EventSource,
    R: GlyphRasterizer,
    B: CellBuffer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualConsole")
            .field("state", &self.state)
            .field("grid", &self.buffer.size())
            .field("geometry", &self.geometry)
            .field("cache", &self.cache)
            .field("frames_presented", &self.frames_presented)
            .finish_non_exhaustive()
    }
}

fn normalize_key_names(names: Vec<CompactString>) -> Vec<CompactString> {
    names
        .into_iter()
        .map(|name| CompactString::from(name.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rogueterm_data::{CellIdentity, GlyphBitmap, GlyphCell, RasterizeError};

    use super::*;
    use crate::{event::QueuedEvents, surface::PixelSurface};

    struct Block;

    impl GlyphRasterizer for Block {
        fn rasterize(&mut self, identity: &CellIdentity) -> Result<GlyphBitmap, RasterizeError> {
            Ok(GlyphBitmap::filled(8, 16, identity.fg.to_rgba()))
        }
    }

    type TestConsole = VirtualConsole<PixelSurface, QueuedEvents, Block>;

    fn console() -> TestConsole {
        let backend = Backend::new(PixelSurface::new(640, 480), QueuedEvents::new(), Block);
        VirtualConsole::new(backend, &ConsoleConfig::default()).unwrap()
    }

    #[test]
    fn new_console_uses_config() {
        let console = console();

        assert_eq!(console.state(), ConsoleState::Running);
        assert_eq!(console.buffer().size(), (80, 30));
        assert_eq!(console.geometry().cell_size(), (8, 16));
        assert_eq!(console.surface().title(), "rogueterm");
        assert_eq!(console.color_depth(), ColorDepth::TrueColor);
    }

    #[test]
    fn frame_without_target_clears_to_background() {
        let mut console = console();
        console.set_background(Color::rgb(0, 0, 80));

        assert_eq!(console.run_frame().unwrap(), ConsoleState::Running);
        assert_eq!(console.surface().pixel(0, 0), Some(Color::rgb(0, 0, 80)));
        assert_eq!(console.frames_presented(), 1);
    }

    #[test]
    fn frame_stop_is_observed_after_present() {
        let mut console = console();
        console.set_target(|frame| {
            frame.buffer_mut().put(GlyphCell::new(0, 0, '@'))?;
            frame.stop();
            Ok(())
        });

        assert_eq!(console.run_frame().unwrap(), ConsoleState::Stopped);
        assert_eq!(console.surface().frames_presented(), 1);
        assert_eq!(console.run_frame().unwrap(), ConsoleState::Stopped);
        assert_eq!(console.surface().frames_presented(), 1);
    }

    #[test]
    fn frame_can_change_background() {
        let mut console = console();
        console.set_target(|frame| {
            frame.set_background(Color::WHITE);
            Ok(())
        });

        console.run_frame().unwrap();

        assert_eq!(console.background(), Color::WHITE);
        assert_eq!(console.surface().pixel(639, 479), Some(Color::WHITE));
    }

    #[test]
    fn keys_are_lower_cased() {
        let mut console = console();
        console.events_mut().key_down("Space");
        console.events_mut().key_down("ÄRGER");

        assert_eq!(
            console.keys_pressed(),
            vec![CompactString::new("space"), CompactString::new("ärger")]
        );
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut console = console();
        console.run_frame().unwrap();
        console.shutdown();
        console.shutdown();

        assert!(console.events().is_released());
        assert_eq!(console.state(), ConsoleState::Stopped);
        assert_eq!(console.run_frame().unwrap(), ConsoleState::Stopped);
    }

    #[test]
    fn construction_failure_releases_backend() {
        struct Empty;

        impl GlyphRasterizer for Empty {
            fn rasterize(&mut self, _: &CellIdentity) -> Result<GlyphBitmap, RasterizeError> {
                Ok(GlyphBitmap::filled(0, 0, [0; 4]))
            }
        }

        let backend = Backend::new(PixelSurface::new(8, 8), QueuedEvents::new(), Empty);
        let result = VirtualConsole::new(backend, &ConsoleConfig::default());

        assert!(matches!(result, Err(Error::Resource(_))));
    }
}
