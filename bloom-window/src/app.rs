use bloom_gpu::{Renderer, ResourceRegistry, SurfaceWrapper, wgpu};
use std::error::Error;
use std::sync::Arc;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Fixed window settings requested before the event loop starts.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

/// Callbacks the host loop drives in a fixed order: `create` once at
/// startup, then `update` and `render` once per frame until shutdown.
pub trait RenderDelegate: Sized {
    /// Create GPU resources. Failing here is fatal: the shell logs the
    /// error and exits without ever rendering.
    fn create(
        renderer: &Renderer,
        registry: &mut ResourceRegistry,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, Box<dyn Error>>;

    /// Per-frame state refresh before any pass is recorded.
    fn update(&mut self, queue: &wgpu::Queue, registry: &ResourceRegistry);

    /// Record and submit the frame against the acquired surface view.
    fn render(
        &mut self,
        renderer: &Renderer,
        registry: &ResourceRegistry,
        surface_view: Arc<wgpu::TextureView>,
    );

    /// Reserved extension point for key handling; default does nothing.
    fn key_down(&mut self, _key: KeyCode) {}
}

/// Run the event loop with a delegate.
pub fn run_with_delegate<D: RenderDelegate + 'static>(
    config: WindowConfig,
) -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let event_loop = EventLoop::new().map_err(|e| format!("failed to create event loop: {e}"))?;
    let mut app = App::<D>::new(config);
    let run_result = event_loop.run_app(&mut app);
    let app_result = app.finish();
    run_result?;
    app_result
}

struct App<D: RenderDelegate> {
    config: WindowConfig,
    state: Option<WindowState<D>>,
    error: Option<String>,
}

impl<D: RenderDelegate> App<D> {
    fn new(config: WindowConfig) -> Self {
        Self {
            config,
            state: None,
            error: None,
        }
    }

    fn finish(self) -> Result<(), Box<dyn Error>> {
        if let Some(err) = self.error {
            Err(err.into())
        } else {
            Ok(())
        }
    }
}

impl<D: RenderDelegate + 'static> ApplicationHandler for App<D> {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.state.is_some() || self.error.is_some() {
            return;
        }

        match WindowState::<D>::new(event_loop, &self.config) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                error!("Failed to initialize: {err}");
                self.error = Some(err.to_string());
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                } else {
                    state.delegate.key_down(code);
                }
            }
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.window.inner_size();
                    state.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory - exiting");
                    event_loop.exit();
                }
                Err(e) => error!("Render error: {e:?}"),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.window.request_redraw();
        }
    }
}

struct WindowState<D: RenderDelegate> {
    window: Arc<Window>,
    renderer: Renderer,
    surface: SurfaceWrapper,
    registry: ResourceRegistry,
    delegate: D,
}

impl<D: RenderDelegate> WindowState<D> {
    fn new(
        event_loop: &winit::event_loop::ActiveEventLoop,
        config: &WindowConfig,
    ) -> Result<Self, Box<dyn Error>> {
        let window_attributes = Window::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let renderer = pollster::block_on(Renderer::new())?;
        let size = window.inner_size();

        let surface = renderer.instance().create_surface(window.clone())?;
        let surface = renderer.create_surface(surface, size.width.max(1), size.height.max(1))?;

        let mut registry = ResourceRegistry::default();
        let delegate = D::create(&renderer, &mut registry, surface.format())?;

        info!(
            width = size.width,
            height = size.height,
            "window and delegate ready"
        );

        Ok(Self {
            window,
            renderer,
            surface,
            registry,
            delegate,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface
            .resize(self.renderer.device(), new_size.width, new_size.height);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.delegate.update(self.renderer.queue(), &self.registry);

        let frame = self.surface.get_current_texture()?;
        let surface_view = Arc::new(
            frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        );

        self.delegate
            .render(&self.renderer, &self.registry, surface_view);

        frame.present();
        Ok(())
    }
}
