//! The interactive viewer session.
//!
//! Owns the window, the GPU session objects, the transform state, and the
//! edit history, and maps native input events onto state transitions. Every
//! transition that changes state triggers exactly one repaint and, when the
//! zoom bounds moved, one scale notification; no-ops do neither.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use crossbeam_channel::Sender;
use tracing::{debug, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::color::Palette;
use crate::config::Configuration;
use crate::error::{Error, ErrorSink};
use crate::gpu::context::GpuContext;
use crate::gpu::pipeline::ViewerPipeline;
use crate::gpu::plane::Plane;
use crate::gpu::texture::ImageTexture;
use crate::history::HistoryStack;
use crate::render::draw_frame;
use crate::tasks::loader::{DecodeOutcome, DecodeRequest, DecodeSlot, spawn_loader};
use crate::viewport::{Viewport, ZoomBounds};

/// Callback invoked with `(scale, min, max)` after every transform change,
/// the hook external zoom-control UI attaches to.
pub type ScaleListener = Box<dyn FnMut(ZoomBounds)>;

/// GPU resources owned by one attached window. Dropped as a unit when the
/// surface is torn down.
struct Session {
    window: Arc<Window>,
    ctx: GpuContext,
    plane: Plane,
    texture: ImageTexture,
    pipeline: ViewerPipeline,
}

/// Open a window and run the viewer until it is closed.
///
/// # Errors
/// Returns an error if the event loop cannot be created or exits abnormally.
/// GPU and decode failures do not end the session; they land in the
/// dismissible error list.
pub fn run_viewer(config: &Configuration, on_scale: Option<ScaleListener>) -> Result<()> {
    let event_loop = EventLoop::<DecodeOutcome>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let (requests, request_rx) = crossbeam_channel::unbounded::<DecodeRequest>();
    let _loader = spawn_loader(request_rx, event_loop.create_proxy());

    let on_scale = on_scale.unwrap_or_else(|| {
        Box::new(|bounds: ZoomBounds| {
            info!(
                scale = bounds.scale,
                min = bounds.min,
                max = bounds.max,
                "zoom changed"
            );
        })
    });

    let mut app = ViewerApp {
        title: config.window.title.clone(),
        initial_size: (config.window.width, config.window.height),
        palette: config.palette(),
        startup_image: config.image.clone(),
        session: None,
        viewport: Viewport::new(),
        history: HistoryStack::new(),
        errors: ErrorSink::new(),
        slot: DecodeSlot::new(),
        requests,
        on_scale,
        last_bounds: None,
        cursor: None,
        dragging: false,
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct ViewerApp {
    title: String,
    initial_size: (u32, u32),
    palette: Palette,
    startup_image: Option<PathBuf>,

    session: Option<Session>,
    viewport: Viewport,
    history: HistoryStack,
    errors: ErrorSink,

    slot: DecodeSlot,
    requests: Sender<DecodeRequest>,

    on_scale: ScaleListener,
    last_bounds: Option<ZoomBounds>,
    cursor: Option<(f64, f64)>,
    dragging: bool,
}

impl ViewerApp {
    /// React to a transition result: repaint once and report the zoom
    /// bounds when they moved. Unchanged state does neither.
    fn apply(&mut self, changed: bool) {
        if !changed {
            return;
        }
        let bounds = self.viewport.bounds();
        if self.last_bounds != Some(bounds) {
            self.last_bounds = Some(bounds);
            (self.on_scale)(bounds);
        }
        if let Some(session) = &self.session {
            session.window.request_redraw();
        }
    }

    fn request_decode(&mut self, path: PathBuf) {
        let generation = self.slot.begin();
        info!(path = %path.display(), generation, "requesting decode");
        if self.requests.send(DecodeRequest { generation, path }).is_err() {
            self.slot.cancel();
            self.errors.push_message("decode worker is gone");
        }
    }

    /// Upload the history cursor's raster and fit the view to it.
    fn show_current(&mut self) {
        let raster = match self.history.current() {
            Ok(raster) => raster.clone(),
            Err(err) => {
                self.errors.push(&err);
                return;
            }
        };
        if let Some(session) = &mut self.session {
            session
                .texture
                .update(session.ctx.device(), session.ctx.queue(), Some(&raster));
            session
                .pipeline
                .rebind_texture(session.ctx.device(), &session.texture);
        }
        let changed = self.viewport.set_image(Some((raster.width(), raster.height())));
        self.update_title();
        self.apply(changed);
    }

    fn undo(&mut self) {
        if self.history.backward() {
            self.show_current();
        }
    }

    fn redo(&mut self) {
        if self.history.forward() {
            self.show_current();
        }
    }

    /// Bake the current zoom into the pixels as a new history entry.
    fn resample(&mut self) {
        let Ok(current) = self.history.current() else {
            return;
        };
        let factor = f64::from(self.viewport.scale());
        if factor == 1.0 {
            return;
        }
        let scaled = current.scale(factor, factor);
        if scaled.is_empty() {
            self.errors
                .push_message(format!("resampling at {factor:.3}x leaves no pixels"));
            return;
        }
        info!(
            width = scaled.width(),
            height = scaled.height(),
            factor,
            "resampled image"
        );
        self.history.push(Arc::new(scaled));
        self.show_current();
    }

    fn close_image(&mut self) {
        if self.history.is_empty() && !self.slot.is_loading() {
            return;
        }
        self.slot.cancel();
        self.history.clear();
        if let Some(session) = &mut self.session {
            session
                .texture
                .update(session.ctx.device(), session.ctx.queue(), None);
            session
                .pipeline
                .rebind_texture(session.ctx.device(), &session.texture);
        }
        let changed = self.viewport.set_image(None);
        self.update_title();
        self.apply(changed);
    }

    fn update_title(&self) {
        let Some(session) = &self.session else {
            return;
        };
        match self.history.name() {
            Some(name) => session.window.set_title(&format!("{name} - {}", self.title)),
            None => session.window.set_title(&self.title),
        }
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        match code {
            KeyCode::Escape | KeyCode::KeyQ => event_loop.exit(),
            KeyCode::Equal | KeyCode::NumpadAdd => {
                let changed = self.viewport.zoom_in();
                self.apply(changed);
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                let changed = self.viewport.zoom_out();
                self.apply(changed);
            }
            KeyCode::Digit0 => {
                let changed = self.viewport.fit();
                self.apply(changed);
            }
            KeyCode::Digit1 => {
                let changed = self.viewport.set_scale(1.0);
                self.apply(changed);
            }
            KeyCode::KeyZ => self.undo(),
            KeyCode::KeyY => self.redo(),
            KeyCode::KeyS => self.resample(),
            KeyCode::KeyW => self.close_image(),
            KeyCode::KeyE => self.errors.dismiss(),
            _ => {}
        }
    }

    fn draw(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        draw_frame(
            &session.ctx,
            &session.pipeline,
            &session.plane,
            &session.texture,
            &self.viewport,
            &self.palette,
        );
    }
}

impl ApplicationHandler<DecodeOutcome> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        let (width, height) = self.initial_size;
        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(f64::from(width), f64::from(height)));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.errors
                    .push(&Error::ResourceCreation(format!("window: {err}")));
                return;
            }
        };

        let ctx = match GpuContext::new(window.clone()) {
            Ok(ctx) => ctx,
            Err(err) => {
                self.errors.push(&Error::ResourceCreation(format!("{err:#}")));
                return;
            }
        };

        let plane = Plane::new(ctx.device());
        let texture = ImageTexture::new(ctx.device(), ctx.queue());
        let pipeline = ViewerPipeline::new(&ctx, &texture, &self.errors);

        let size = window.inner_size();
        self.session = Some(Session {
            window,
            ctx,
            plane,
            texture,
            pipeline,
        });
        info!(width = size.width, height = size.height, "viewer surface ready");

        let changed = self.viewport.set_container(size.width, size.height);
        self.apply(changed);

        if let Some(path) = self.startup_image.take() {
            self.request_decode(path);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if let Some(session) = &self.session
            && session.window.id() != window_id
        {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let changed = self.viewport.set_container(size.width, size.height);
                if changed && let Some(session) = &mut self.session {
                    session.ctx.resize(size.width, size.height);
                }
                self.apply(changed);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Released
                    && let PhysicalKey::Code(code) = event.physical_key
                {
                    self.handle_key(code, event_loop);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let up = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y > 0.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y > 0.0,
                };
                let changed = if up {
                    self.viewport.zoom_in()
                } else {
                    self.viewport.zoom_out()
                };
                self.apply(changed);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging && let Some((last_x, last_y)) = self.cursor {
                    #[allow(clippy::cast_possible_truncation)]
                    let changed = self
                        .viewport
                        .translate((position.x - last_x) as f32, (position.y - last_y) as f32);
                    self.apply(changed);
                }
                self.cursor = Some((position.x, position.y));
            }
            WindowEvent::DroppedFile(path) => self.request_decode(path),
            WindowEvent::RedrawRequested => self.draw(),
            _ => {}
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, outcome: DecodeOutcome) {
        match outcome {
            DecodeOutcome::Decoded {
                generation,
                path,
                raster,
            } => {
                if !self.slot.accept(generation) {
                    let aborted = Error::DecodeAborted(path.display().to_string());
                    debug!(error = %aborted, "ignoring stale decode");
                    return;
                }
                info!(
                    path = %path.display(),
                    width = raster.width(),
                    height = raster.height(),
                    "image decoded"
                );
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                self.history.load(Arc::new(raster), name);
                self.show_current();
            }
            DecodeOutcome::Failed {
                generation,
                path,
                reason,
            } => {
                if !self.slot.accept(generation) {
                    debug!(path = %path.display(), "ignoring stale decode failure");
                    return;
                }
                self.errors.push(&Error::DecodeFailed {
                    path: path.display().to_string(),
                    reason,
                });
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Drop program, texture, and plane with the session.
        self.session = None;
        debug!("released viewer resources");
    }
}
