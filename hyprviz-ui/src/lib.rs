mod bindings;
mod control_panel;
mod meter;
mod scene;
mod state;

pub use bindings::{InjectReport, UniformBindingCache, UniformHost, Visualizer};
pub use scene::{GlowHost, ShaderScene, ShaderSource};

use std::sync::{Arc, Mutex};

use eframe::egui_glow;
use eframe::glow;
use hyprviz_messages::{Command, ConnectionState, Event, SnapshotStore};
use log::{error, info, warn};
use state::UiState;

/// Main application struct implementing the egui App trait.
pub struct HyprvizApp {
    /// Receiver for events from engine
    event_rx: flume::Receiver<Event>,

    /// Band values published by the engine
    store: Arc<SnapshotStore>,

    /// Shader effect; `None` when no GL context is available or compilation failed
    scene: Option<Arc<Mutex<ShaderScene>>>,
    shader: ShaderSource,

    /// Local application state
    state: UiState,
}

impl HyprvizApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        store: Arc<SnapshotStore>,
        event_rx: flume::Receiver<Event>,
        cmd_tx: flume::Sender<Command>,
        shader: ShaderSource,
    ) -> Self {
        let scene = cc.gl.as_ref().and_then(|gl| {
            let built = shader
                .load()
                .and_then(|source| ShaderScene::new(gl, &source, Arc::clone(&store)));
            match built {
                Ok(scene) => Some(Arc::new(Mutex::new(scene))),
                Err(e) => {
                    error!("Shader effect disabled: {e:#}");
                    None
                }
            }
        });

        Self {
            event_rx,
            state: UiState::new(store.layout(), cmd_tx),
            store,
            scene,
            shader,
        }
    }

    fn reload_shader(&self, gl: &glow::Context) {
        let Some(scene) = &self.scene else {
            return;
        };
        let result = self.shader.load().and_then(|source| match scene.lock() {
            Ok(mut scene) => scene.reload(gl, &source),
            Err(_) => Err(anyhow::anyhow!("Shader scene lock poisoned")),
        });
        if let Err(e) = result {
            warn!("Keeping previous shader: {e:#}");
        }
    }

    fn paint_scene(&self, ui: &mut eframe::egui::Ui) {
        let Some(scene) = &self.scene else {
            ui.centered_and_justified(|ui| {
                ui.label("Shader effect unavailable");
            });
            return;
        };

        let rect = ui.available_rect_before_wrap();
        let scene = Arc::clone(scene);
        let callback = eframe::egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |_info, painter| {
                if let Ok(mut scene) = scene.lock() {
                    scene.paint(painter.gl());
                }
            })),
        };
        ui.painter().add(callback);
    }
}

impl eframe::App for HyprvizApp {
    fn update(&mut self, ctx: &eframe::egui::Context, frame: &mut eframe::Frame) {
        // Pull events from engine
        for event in self.event_rx.try_iter() {
            self.state.handle_event(event);
        }
        self.state.set_connection(self.store.connection());

        let snapshot = self.store.current();
        self.state.meter.update(&snapshot);
        let report = self
            .scene
            .as_ref()
            .and_then(|scene| scene.lock().ok().map(|scene| scene.last_report()));
        self.state
            .control_panel
            .set_frame_status(snapshot.sequence(), report);

        if self.state.control_panel.take_reload_request() {
            match frame.gl() {
                Some(gl) => self.reload_shader(gl),
                None => warn!("Shader reload requested without a GL context"),
            }
        }

        // Always request continuous repainting for smooth 60 FPS
        ctx.request_repaint();

        // Right side panel for controls
        eframe::egui::SidePanel::right("control_panel")
            .default_width(250.0)
            .show(ctx, |ui| {
                ui.add(&mut self.state.control_panel);
                ui.add_space(10.0);
                ui.add(&mut self.state.meter);
            });

        // Central panel for the shader effect
        eframe::egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.connection != ConnectionState::Connected {
                ui.label("Waiting for producer connection...");
            }
            self.paint_scene(ui);
        });
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let (Some(gl), Some(scene)) = (gl, &self.scene) {
            if let Ok(scene) = scene.lock() {
                scene.destroy(gl);
            }
        }
        info!("UI closed");
    }
}

/// Entry point for the UI module.
///
/// Runs the eframe application on the main thread (blocking).
pub fn run(
    store: Arc<SnapshotStore>,
    event_rx: flume::Receiver<Event>,
    cmd_tx: flume::Sender<Command>,
    shader: ShaderSource,
) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_title("hyprviz"),
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    eframe::run_native(
        "hyprviz",
        options,
        Box::new(|cc| {
            Ok(Box::new(HyprvizApp::new(
                cc, store, event_rx, cmd_tx, shader,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
