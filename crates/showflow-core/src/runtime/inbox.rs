use tokio::sync::mpsc;

use crate::events::HostEvent;

/// Sender for the runtime's event inbox.
pub type HostEventSender = mpsc::UnboundedSender<HostEvent>;

/// Receiver for the runtime's event inbox.
pub type HostEventReceiver = mpsc::UnboundedReceiver<HostEvent>;
