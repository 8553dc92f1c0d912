//! Session-bus transport for the control surface (`dbus` feature).
//!
//! Calls are forwarded to the event loop through the runtime's control
//! channel and answered from there; the bus thread waits at most
//! [`REPLY_TIMEOUT`] for the compositor. Compositor events go the other way
//! as `CompositingToggled` and `SuspendedNotice` signals.

use std::sync::{mpsc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use calloop::channel::Sender;
use zbus::names::BusName;
use zbus::{blocking, dbus_interface, fdo};

use crate::compositor::CompositorEvent;
use crate::control::{ControlMessage, ControlReply, ControlRequest};
use crate::suspend::SuspendReason;

pub const BUS_NAME: &str = "org.novade.Compositing";
pub const OBJECT_PATH: &str = "/Compositor";
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct CompositingInterface {
    sender: Mutex<Sender<ControlMessage>>,
}

impl CompositingInterface {
    pub fn new(sender: Sender<ControlMessage>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }

    fn request(&self, request: ControlRequest) -> fdo::Result<ControlReply> {
        let (message, reply) = ControlMessage::new(request);
        {
            let sender = self
                .sender
                .lock()
                .map_err(|_| fdo::Error::Failed("control channel lock poisoned".to_string()))?;
            sender
                .send(message)
                .map_err(|_| fdo::Error::Failed("compositor is not running".to_string()))?;
        }
        reply
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| fdo::Error::TimedOut("compositor did not answer".to_string()))
    }

    fn request_done(&self, request: ControlRequest) -> fdo::Result<()> {
        self.request(request).map(|_| ())
    }

    fn request_bool(&self, request: ControlRequest) -> fdo::Result<bool> {
        match self.request(request)? {
            ControlReply::Bool(value) => Ok(value),
            other => Err(fdo::Error::Failed(format!("unexpected reply {other:?}"))),
        }
    }

    fn request_text(&self, request: ControlRequest) -> fdo::Result<String> {
        match self.request(request)? {
            ControlReply::Text(value) => Ok(value),
            other => Err(fdo::Error::Failed(format!("unexpected reply {other:?}"))),
        }
    }
}

fn parse_reason(name: &str) -> fdo::Result<SuspendReason> {
    SuspendReason::from_control_name(name).ok_or_else(|| fdo::Error::InvalidArgs(format!("unknown suspend reason '{name}'")))
}

#[dbus_interface(name = "org.novade.Compositing")]
impl CompositingInterface {
    fn toggle_compositing(&self) -> fdo::Result<()> {
        self.request_done(ControlRequest::ToggleCompositing)
    }

    fn set_compositing(&self, active: bool) -> fdo::Result<()> {
        self.request_done(ControlRequest::SetCompositing(active))
    }

    /// `reason` is one of `user`, `rule`, `script` or `all`.
    fn suspend(&self, reason: &str) -> fdo::Result<()> {
        self.request_done(ControlRequest::Suspend(parse_reason(reason)?))
    }

    fn resume(&self, reason: &str) -> fdo::Result<()> {
        self.request_done(ControlRequest::Resume(parse_reason(reason)?))
    }

    fn reinitialize(&self) -> fdo::Result<()> {
        self.request_done(ControlRequest::Reinitialize)
    }

    fn is_active(&self) -> fdo::Result<bool> {
        self.request_bool(ControlRequest::IsActive)
    }

    fn compositing_type(&self) -> fdo::Result<String> {
        self.request_text(ControlRequest::CompositingType)
    }

    fn is_compositing_possible(&self) -> fdo::Result<bool> {
        self.request_bool(ControlRequest::IsCompositingPossible)
    }

    fn compositing_not_possible_reason(&self) -> fdo::Result<String> {
        self.request_text(ControlRequest::CompositingNotPossibleReason)
    }
}

/// Claims [`BUS_NAME`] on the session bus and serves the interface at [`OBJECT_PATH`].
/// The service lives as long as the returned connection.
pub fn serve(sender: Sender<ControlMessage>) -> zbus::Result<blocking::Connection> {
    let connection = blocking::ConnectionBuilder::session()?
        .name(BUS_NAME)?
        .serve_at(OBJECT_PATH, CompositingInterface::new(sender))?
        .build()?;
    tracing::info!(name = BUS_NAME, path = OBJECT_PATH, "Compositing control available on the session bus");
    Ok(connection)
}

/// Broadcasts `event` as a signal on [`OBJECT_PATH`].
pub fn emit_event(connection: &blocking::Connection, event: &CompositorEvent) -> zbus::Result<()> {
    match event {
        CompositorEvent::CompositingToggled(active) => connection.emit_signal(
            None::<BusName<'_>>,
            OBJECT_PATH,
            BUS_NAME,
            "CompositingToggled",
            &(*active,),
        ),
        CompositorEvent::SuspendedNotice { message } => connection.emit_signal(
            None::<BusName<'_>>,
            OBJECT_PATH,
            BUS_NAME,
            "SuspendedNotice",
            &(message.as_str(),),
        ),
    }
}

/// Emits every event from `events` until the runtime drops its sender.
pub fn forward_events(connection: blocking::Connection, events: mpsc::Receiver<CompositorEvent>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for event in events {
            if let Err(err) = emit_event(&connection, &event) {
                tracing::warn!(error = %err, event = ?event, "Could not emit compositing signal");
            }
        }
    })
}
