
use huddle_client::{ConnectionSupervisor, LinkEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::{MockConnector, MockMediaDevices, RecordingSink};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct SupervisorFixture {
    pub supervisor: ConnectionSupervisor,
    pub connector: MockConnector,
    pub devices: MockMediaDevices,
    pub sink: RecordingSink,
    pub link_rx: mpsc::UnboundedReceiver<LinkEvent>,
}

pub fn create_test_supervisor() -> SupervisorFixture {
    let connector = MockConnector::new();
    let devices = MockMediaDevices::new();
    let sink = RecordingSink::new();
    let (link_tx, link_rx) = mpsc::unbounded_channel();

    let supervisor = ConnectionSupervisor::new(
        Arc::new(connector.clone()),
        Arc::new(devices.clone()),
        Arc::new(sink.clone()),
        link_tx,
    );

    SupervisorFixture {
        supervisor,
        connector,
        devices,
        sink,
        link_rx,
    }
}
