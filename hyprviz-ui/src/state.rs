use flume::Sender;

use crate::control_panel::ControlPanel;
use crate::meter::BandMeter;
use hyprviz_messages::{BandLayout, Command, ConnectionState, Event};

/// Local UI state derived from engine events.
pub(super) struct UiState {
    /// Last connection state reported by the engine
    pub connection: ConnectionState,

    /// Band meter widget state
    pub meter: BandMeter,

    /// Control panel widget state
    pub control_panel: ControlPanel,
}

impl UiState {
    pub fn new(layout: &BandLayout, cmd_tx: Sender<Command>) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            meter: BandMeter::new(layout.names()),
            control_panel: ControlPanel::new(cmd_tx),
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::ConnectionChanged(state) => self.set_connection(state),
            Event::RecordsRejected { count, reason } => {
                self.control_panel.record_rejection(count, reason);
            }
        }
    }

    /// Apply the state held by the store. Runs every frame after the
    /// events, so a dropped event never leaves the panel behind.
    pub fn set_connection(&mut self, state: ConnectionState) {
        self.control_panel.set_connection(state);
        self.connection = state;
    }
}
