//! Remote-control command surface.
//!
//! Transport-independent: requests arrive as [`ControlRequest`] values (over
//! the runtime's channel, from D-Bus with the `dbus` feature, or directly in
//! tests) and are answered with a [`ControlReply`].

use std::sync::mpsc;

use crate::compositor::Compositor;
use crate::display::DisplayConnection;
use crate::suspend::SuspendReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    ToggleCompositing,
    SetCompositing(bool),
    Suspend(SuspendReason),
    Resume(SuspendReason),
    IsActive,
    CompositingType,
    IsCompositingPossible,
    CompositingNotPossibleReason,
    Reinitialize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlReply {
    Done,
    Bool(bool),
    Text(String),
}

/// A request plus where to send the answer. Fire-and-forget without `reply`.
#[derive(Debug)]
pub struct ControlMessage {
    pub request: ControlRequest,
    pub reply: Option<mpsc::Sender<ControlReply>>,
}

impl ControlMessage {
    pub fn new(request: ControlRequest) -> (Self, mpsc::Receiver<ControlReply>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                request,
                reply: Some(sender),
            },
            receiver,
        )
    }
}

pub fn handle_control<D: DisplayConnection>(compositor: &mut Compositor<D>, request: ControlRequest) -> ControlReply {
    tracing::debug!(request = ?request, "Control request");
    match request {
        ControlRequest::ToggleCompositing => {
            compositor.toggle_compositing_remote();
            ControlReply::Done
        }
        ControlRequest::SetCompositing(active) => {
            compositor.set_compositing(active);
            ControlReply::Done
        }
        ControlRequest::Suspend(reason) => {
            compositor.suspend(reason);
            ControlReply::Done
        }
        ControlRequest::Resume(reason) => {
            compositor.resume(reason);
            ControlReply::Done
        }
        ControlRequest::IsActive => ControlReply::Bool(compositor.is_active()),
        ControlRequest::CompositingType => ControlReply::Text(compositor.compositing_type().to_string()),
        ControlRequest::IsCompositingPossible => ControlReply::Bool(compositor.is_compositing_possible()),
        ControlRequest::CompositingNotPossibleReason => {
            ControlReply::Text(compositor.compositing_not_possible_reason())
        }
        ControlRequest::Reinitialize => {
            let config = compositor.config().clone();
            compositor.reinitialize(config);
            ControlReply::Done
        }
    }
}

/// Handles `message` and sends the reply, if anyone is still waiting for it.
pub fn dispatch_message<D: DisplayConnection>(compositor: &mut Compositor<D>, message: ControlMessage) {
    let reply = handle_control(compositor, message.request);
    if let Some(sender) = message.reply {
        if sender.send(reply).is_err() {
            tracing::debug!("Control caller went away before the reply");
        }
    }
}
