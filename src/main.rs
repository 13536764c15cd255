use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use sector_walk::{AppConfig, Engine, Input, WgpuBackend};

#[derive(Parser)]
#[command(name = "sector-walk", about = "Walk through a textured 3D sector")]
struct Cli {
    /// Start in fullscreen mode
    #[arg(long)]
    fullscreen: bool,

    /// Directory containing Data/World.txt and Data/Mud.bmp
    #[arg(long, default_value = ".")]
    resources: PathBuf,

    /// Window width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

enum SectorWalkApp {
    Pending {
        config: AppConfig,
    },
    Running {
        window: Arc<Window>,
        engine: Engine<WgpuBackend>,
        input: Input,
    },
    Finished {
        error: Option<anyhow::Error>,
    },
}

impl SectorWalkApp {
    fn start(config: &AppConfig, event_loop: &ActiveEventLoop) -> anyhow::Result<Self> {
        let mut window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        if config.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("failed to create window")?,
        );
        let backend = WgpuBackend::new(window.clone()).context("failed to initialise the GPU")?;
        let engine = Engine::init(backend, &config.resource_root).with_context(|| {
            format!(
                "failed to load the world from {}",
                config.resource_root.display()
            )
        })?;

        window.request_redraw();
        Ok(SectorWalkApp::Running {
            window,
            engine,
            input: Input::new(),
        })
    }

    fn finish(&mut self, event_loop: &ActiveEventLoop, error: Option<anyhow::Error>) {
        if let SectorWalkApp::Running { engine, .. } =
            std::mem::replace(self, SectorWalkApp::Finished { error })
        {
            engine.shutdown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for SectorWalkApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let SectorWalkApp::Pending { config } = self {
            match Self::start(config, event_loop) {
                Ok(running) => *self = running,
                Err(e) => self.finish(event_loop, Some(e)),
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let SectorWalkApp::Running {
            window,
            engine,
            input,
        } = self
        else {
            return;
        };

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => self.finish(event_loop, None),
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed && !key.repeat =>
            {
                match key.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => self.finish(event_loop, None),
                    PhysicalKey::Code(KeyCode::F1) => {
                        let fullscreen = match window.fullscreen() {
                            Some(_) => None,
                            None => Some(Fullscreen::Borderless(None)),
                        };
                        window.set_fullscreen(fullscreen);
                    }
                    _ => {}
                }
            }
            WindowEvent::Resized(size) => {
                engine.on_resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                for flag in input.flags() {
                    engine.on_input(flag);
                }
                input.end_frame();

                match engine.render_frame() {
                    Ok(_) => window.request_redraw(),
                    Err(e) => {
                        log::error!("render failed: {e}");
                        self.finish(event_loop, Some(e.into()));
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    if let Err(e) =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
            .try_init()
    {
        eprintln!("Warning: Could not initialize logger: {e}");
    }

    let config = AppConfig::new()
        .size(cli.width, cli.height)
        .fullscreen(cli.fullscreen)
        .resource_root(cli.resources);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SectorWalkApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        SectorWalkApp::Finished { error: Some(e) } => Err(e),
        _ => Ok(()),
    }
}
