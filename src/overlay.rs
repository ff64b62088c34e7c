//! The always-on-top face window.

use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{Context, anyhow};
use micbuddy_core::Config;
use micbuddy_face::{FACE_SIZE, FaceEngine, Renderer, Shape};
use softbuffer::Surface;
use tao::dpi::{LogicalSize, PhysicalPosition};
use tao::event::{ElementState, MouseButton, WindowEvent};
use tao::event_loop::EventLoopWindowTarget;
use tao::window::{Window, WindowBuilder, WindowId};
use tracing::debug;

use crate::coordinator::OverlayControl;
use crate::event::MicBuddyEvent;

/// Gap between the overlay and the screen edges after a reset.
const EDGE_MARGIN: i32 = 20;

/// Borderless window showing the face, dragged around with the left button.
pub struct Overlay {
    window: Rc<Window>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    surface_size: (u32, u32),
    renderer: Renderer,
    engine: FaceEngine,
    drag: Drag,
}

impl Overlay {
    /// Creates the window hidden, at the saved position if there is one.
    pub fn new(
        target: &EventLoopWindowTarget<MicBuddyEvent>,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let size = f64::from(FACE_SIZE);
        let window = WindowBuilder::new()
            .with_title(micbuddy_core::APP_NAME_PRETTY)
            .with_inner_size(LogicalSize::new(size, size))
            .with_decorations(false)
            .with_resizable(false)
            .with_always_on_top(true)
            .with_transparent(true)
            .with_visible(false)
            .build(target)
            .context("Failed to create overlay window")?;
        let window = Rc::new(window);

        if let Some(position) = config.position() {
            window.set_outer_position(PhysicalPosition::new(position.x, position.y));
        }

        let context = softbuffer::Context::new(window.clone()).map_err(surface_error)?;
        let surface = Surface::new(&context, window.clone()).map_err(surface_error)?;

        let inner = window.inner_size();
        let renderer =
            Renderer::new(inner.width, inner.height).context("Overlay window has no area")?;

        Ok(Self {
            window,
            surface,
            surface_size: (0, 0),
            renderer,
            engine: FaceEngine::new(config.fade_speed),
            drag: Drag::default(),
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Advances the animation by one frame and draws it if visible.
    pub fn frame(&mut self) -> anyhow::Result<()> {
        match self.engine.tick() {
            Some(shapes) => self.present(&shapes),
            None => Ok(()),
        }
    }

    /// Draws the current state without advancing it.
    pub fn redraw(&mut self) -> anyhow::Result<()> {
        if !self.engine.is_visible() {
            return Ok(());
        }
        let shapes = self.engine.frame();
        self.present(&shapes)
    }

    /// Moves the window to the top-right corner of its monitor and returns
    /// the new position.
    pub fn reset_position(&mut self) -> Option<(i32, i32)> {
        let monitor = self
            .window
            .current_monitor()
            .or_else(|| self.window.primary_monitor())?;
        let origin = monitor.position();
        let (x, y) = default_position(
            (origin.x, origin.y),
            monitor.size().width,
            self.window.outer_size().width,
        );
        self.window.set_outer_position(PhysicalPosition::new(x, y));
        debug!(x, y, "overlay position reset");
        Some((x, y))
    }

    /// Feeds a window event to the drag handler. Returns the final position
    /// when a drag ends.
    pub fn handle_window_event(&mut self, event: &WindowEvent<'_>) -> Option<(i32, i32)> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.drag.cursor = (position.x, position.y);
                if let Some(grab) = self.drag.grab {
                    if let Ok(outer) = self.window.outer_position() {
                        let (x, y) = dragged_to((outer.x, outer.y), grab, self.drag.cursor);
                        self.window.set_outer_position(PhysicalPosition::new(x, y));
                    }
                }
                None
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.drag.grab = Some(self.drag.cursor);
                    None
                }
                ElementState::Released => {
                    self.drag.grab.take()?;
                    let outer = self.window.outer_position().ok()?;
                    Some((outer.x, outer.y))
                }
                _ => None,
            },
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.window.request_redraw();
                None
            }
            _ => None,
        }
    }

    fn present(&mut self, shapes: &[Shape]) -> anyhow::Result<()> {
        let inner = self.window.inner_size();
        let (Some(width), Some(height)) =
            (NonZeroU32::new(inner.width), NonZeroU32::new(inner.height))
        else {
            return Ok(());
        };

        if self.surface_size != (inner.width, inner.height) {
            self.surface.resize(width, height).map_err(surface_error)?;
            self.renderer.resize(inner.width, inner.height);
            self.surface_size = (inner.width, inner.height);
        }

        self.renderer.render(shapes);
        let mut buffer = self.surface.buffer_mut().map_err(surface_error)?;
        self.renderer.copy_to(&mut buffer);
        buffer.present().map_err(surface_error)
    }
}

impl OverlayControl for Overlay {
    fn show(&mut self) {
        if !self.engine.is_visible() {
            self.window.set_visible(true);
            self.window.set_always_on_top(true);
        }
        self.engine.show();
    }

    fn hide(&mut self) {
        if self.engine.is_visible() {
            self.window.set_visible(false);
        }
        self.engine.hide();
        self.drag.grab = None;
    }

    fn set_live(&mut self, live: bool) {
        self.engine.set_live(live);
    }
}

/// Window-relative cursor tracking for dragging.
#[derive(Debug, Default)]
struct Drag {
    cursor: (f64, f64),
    /// Cursor position when the button went down.
    grab: Option<(f64, f64)>,
}

fn dragged_to(outer: (i32, i32), grab: (f64, f64), cursor: (f64, f64)) -> (i32, i32) {
    (
        outer.0 + (cursor.0 - grab.0).round() as i32,
        outer.1 + (cursor.1 - grab.1).round() as i32,
    )
}

fn default_position(monitor_origin: (i32, i32), monitor_width: u32, window_width: u32) -> (i32, i32) {
    (
        monitor_origin.0 + monitor_width as i32 - window_width as i32 - EDGE_MARGIN,
        monitor_origin.1 + EDGE_MARGIN,
    )
}

fn surface_error(e: softbuffer::SoftBufferError) -> anyhow::Error {
    anyhow!("softbuffer: {e}")
}
