use eframe::egui::{Color32, Response, RichText, Ui, Widget};
use flume::Sender;

use hyprviz_messages::{Command, ConnectionState};

use crate::bindings::InjectReport;

/// Status and controls for the producer connection and the shader.
pub struct ControlPanel {
    cmd_tx: Sender<Command>,
    connection: ConnectionState,
    rejected: u64,
    last_rejection: Option<String>,
    sequence: u64,
    report: Option<InjectReport>,
    reload_requested: bool,
}

impl ControlPanel {
    pub fn new(cmd_tx: Sender<Command>) -> Self {
        Self {
            cmd_tx,
            connection: ConnectionState::Disconnected,
            rejected: 0,
            last_rejection: None,
            sequence: 0,
            report: None,
            reload_requested: false,
        }
    }

    pub fn set_connection(&mut self, state: ConnectionState) {
        self.connection = state;
    }

    pub fn record_rejection(&mut self, count: usize, reason: String) {
        self.rejected += count as u64;
        self.last_rejection = Some(reason);
    }

    pub fn set_frame_status(&mut self, sequence: u64, report: Option<InjectReport>) {
        self.sequence = sequence;
        self.report = report;
    }

    /// True once after the reload button was clicked.
    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    fn send_reconnect(&self) {
        let _ = self.cmd_tx.send(Command::Reconnect);
    }
}

fn state_color(state: ConnectionState) -> Color32 {
    match state {
        ConnectionState::Connected => Color32::from_rgb(50, 230, 100),
        ConnectionState::Connecting => Color32::YELLOW,
        ConnectionState::Disconnected => Color32::GRAY,
        ConnectionState::Failed => Color32::from_rgb(255, 60, 60),
    }
}

impl Widget for &mut ControlPanel {
    fn ui(self, ui: &mut Ui) -> Response {
        ui.heading("Producer");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("State:");
            ui.label(RichText::new(self.connection.to_string()).color(state_color(self.connection)));
        });
        ui.label(format!("Snapshot: #{}", self.sequence));
        ui.label(format!("Rejected records: {}", self.rejected));
        if let Some(reason) = &self.last_rejection {
            ui.label(RichText::new(reason).small().weak());
        }

        ui.add_space(10.0);
        if ui.button("Reconnect").clicked() {
            self.send_reconnect();
        }

        ui.add_space(10.0);
        ui.heading("Shader");
        ui.separator();

        match self.report {
            Some(report) => {
                ui.label(format!(
                    "Uniforms written: {} (missing {})",
                    report.written, report.skipped
                ));
            }
            None => {
                ui.label("No GL program");
            }
        }

        ui.add_enabled_ui(self.report.is_some(), |ui| {
            if ui.button("Reload shader").clicked() {
                self.reload_requested = true;
            }
        });

        ui.response()
    }
}
