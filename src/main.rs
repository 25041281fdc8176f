use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use grid_raycaster::canvas::Framebuffer;
use grid_raycaster::input::PoseCommand;
use grid_raycaster::scaler::{ScaleLut, blit_nearest};
use grid_raycaster::{Session, Settings};

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    session: Session,
    window_size: LogicalSize<f64>,

    // Frame stats
    frame_counter: u32,
    render_time: Duration,
    last_stats: Instant,

    // Internal low-res buffer, stretched to the window
    fb_small: Vec<u32>,
    fb_w: usize,
    fb_h: usize,
    scale_lut: ScaleLut,
}

impl App {
    fn new(session: Session, settings: &Settings) -> Self {
        let fb_h = settings.internal_height;
        let fb_w = fb_h * 4 / 3;
        Self {
            window: None,
            surface: None,
            session,
            window_size: LogicalSize::new(
                settings.window_width as f64,
                settings.window_height as f64,
            ),

            frame_counter: 0,
            render_time: Duration::ZERO,
            last_stats: Instant::now(),

            fb_small: vec![0; fb_w * fb_h],
            fb_w,
            fb_h,
            scale_lut: ScaleLut::empty(),
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("Grid Raycaster")
            .with_inner_size(self.window_size);

        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| anyhow!("create window: {e}"))?,
        );
        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| anyhow!("softbuffer context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow!("softbuffer surface: {e}"))?;

        let size = window.inner_size();
        self.rebuild_internal_fb_and_lut(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn draw(&mut self) -> Result<()> {
        let Some(window) = &self.window else {
            return Ok(());
        };

        let size = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // Minimized window, skip drawing
        };
        let (dw, dh) = (size.width as usize, size.height as usize);
        if self.scale_lut.dst_size() != (dw, dh) {
            self.rebuild_internal_fb_and_lut(dw, dh);
        }

        let Some(surface) = &mut self.surface else {
            return Ok(());
        };
        surface
            .resize(w, h)
            .map_err(|e| anyhow!("resize surface: {e}"))?;

        let start = Instant::now();
        let mut canvas = Framebuffer::new(&mut self.fb_small, self.fb_w, self.fb_h);
        self.session.render(&mut canvas, self.fb_w, self.fb_h);

        let mut buf = surface
            .buffer_mut()
            .map_err(|e| anyhow!("surface buffer: {e}"))?;
        blit_nearest(&mut buf, dw, &self.fb_small, self.fb_w, &self.scale_lut);
        buf.present().map_err(|e| anyhow!("present: {e}"))?;
        self.render_time += start.elapsed();

        self.frame_counter += 1;
        let now = Instant::now();
        if now.duration_since(self.last_stats) >= Duration::from_secs(1) {
            log::debug!(
                "{} frames, {:.2} ms average",
                self.frame_counter,
                self.render_time.as_secs_f64() * 1000.0 / self.frame_counter as f64
            );
            self.frame_counter = 0;
            self.render_time = Duration::ZERO;
            self.last_stats = now;
        }
        Ok(())
    }

    fn rebuild_internal_fb_and_lut(&mut self, dst_w: usize, dst_h: usize) {
        // Keep internal height fixed (controls pixel size look)
        let target_h = self.fb_h;
        let aspect = if dst_h > 0 {
            dst_w as f64 / dst_h as f64
        } else {
            1.0
        };

        let mut target_w = ((target_h as f64 * aspect).round() as usize).max(160);
        if target_w % 2 != 0 {
            target_w += 1;
        }

        if target_w != self.fb_w {
            log::info!("Internal framebuffer {target_w}x{target_h} for window {dst_w}x{dst_h}");
            self.fb_w = target_w;
            self.fb_small = vec![0u32; self.fb_w * self.fb_h];
        }

        self.scale_lut = ScaleLut::new(dst_w, dst_h, self.fb_w, self.fb_h);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("{e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().is_none_or(|w| w.id() != id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                } else if let Some(command) = PoseCommand::from_key(code) {
                    if self.session.apply(command) {
                        self.request_redraw();
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let pixel = self.scale_lut.to_source(position.x, position.y);
                if self.session.point_at(Some(pixel)) {
                    self.request_redraw();
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if self.session.point_at(None) {
                    self.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.draw() {
                    log::warn!("Render error: {e:#}");
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_internal_fb_and_lut(new_size.width as usize, new_size.height as usize);
                self.request_redraw();
            }
            _ => (),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            log::info!("Loading settings from {}", path.display());
            Settings::load(&path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Settings::default(),
    };
    let session = Session::new(&settings).context("invalid settings")?;

    let event_loop = EventLoop::new().map_err(|e| anyhow!("create event loop: {e}"))?;

    // Only redraw in response to input; nothing animates between events.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(session, &settings);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("event loop: {e}"))?;
    Ok(())
}
