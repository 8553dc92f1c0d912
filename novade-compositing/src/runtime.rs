//! calloop wiring.
//!
//! [`Runtime`] owns the event loop and the [`Session`] it dispatches into.
//! Compositor timers become calloop timer sources, control requests arrive
//! over a calloop channel, and SIGINT/SIGTERM raise a flag that ends
//! [`Runtime::run`]. Compositor events are drained after every iteration,
//! logged, and handed to [`Runtime::subscribe`] receivers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use calloop::channel::{self, Sender};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle, RegistrationToken};
use novade_core::config::CompositingConfig;
use signal_hook::consts::{SIGINT, SIGTERM};

use crate::compositor::{Compositor, CompositorEvent};
use crate::control::{dispatch_message, ControlMessage};
use crate::display::DisplayConnection;
use crate::error::Result;
use crate::scene::SceneFactory;
use crate::timer::{TimerId, TimerQueue};

/// Upper bound on one loop iteration so display events are polled regularly.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Receives expired timers.
pub trait TimerTarget {
    fn on_timer(&mut self, id: TimerId);
}

/// Event-loop data.
pub struct Session<D: DisplayConnection> {
    pub compositor: Compositor<D>,
}

impl<D: DisplayConnection> TimerTarget for Session<D> {
    fn on_timer(&mut self, id: TimerId) {
        tracing::trace!(timer = ?id, "Timer fired");
        self.compositor.handle_timer(id);
    }
}

/// [`TimerQueue`] backed by one calloop timer source per armed [`TimerId`].
pub struct CalloopTimers<Data: 'static> {
    handle: LoopHandle<'static, Data>,
    armed: Rc<RefCell<HashMap<TimerId, RegistrationToken>>>,
}

impl<Data: 'static> CalloopTimers<Data> {
    pub fn new(handle: LoopHandle<'static, Data>) -> Self {
        Self {
            handle,
            armed: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl<Data: TimerTarget + 'static> TimerQueue for CalloopTimers<Data> {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn start(&mut self, id: TimerId, after: Duration) {
        self.stop(id);
        let armed = Rc::clone(&self.armed);
        let inserted = self
            .handle
            .insert_source(Timer::from_duration(after), move |_deadline, _, data: &mut Data| {
                // Forget the token first: the handler may re-arm the same id.
                armed.borrow_mut().remove(&id);
                data.on_timer(id);
                TimeoutAction::Drop
            });
        match inserted {
            Ok(token) => {
                self.armed.borrow_mut().insert(id, token);
            }
            Err(err) => tracing::error!(timer = ?id, error = %err.error, "Could not arm timer"),
        }
    }

    fn stop(&mut self, id: TimerId) {
        let token = self.armed.borrow_mut().remove(&id);
        if let Some(token) = token {
            self.handle.remove(token);
        }
    }

    fn is_active(&self, id: TimerId) -> bool {
        self.armed.borrow().contains_key(&id)
    }
}

pub struct Runtime<D: DisplayConnection + 'static> {
    session: Session<D>,
    event_loop: EventLoop<'static, Session<D>>,
    control: Sender<ControlMessage>,
    shutdown: Arc<AtomicBool>,
    subscribers: Vec<mpsc::Sender<CompositorEvent>>,
}

impl<D: DisplayConnection + 'static> Runtime<D> {
    /// Builds the loop and an inactive compositor; call `compositor_mut().setup()` to start.
    pub fn new(display: D, scene_factory: Box<dyn SceneFactory>, config: CompositingConfig) -> Result<Self> {
        let event_loop: EventLoop<'static, Session<D>> = EventLoop::try_new()?;
        let timers = CalloopTimers::new(event_loop.handle());
        let compositor = Compositor::new(display, scene_factory, Box::new(timers), config);

        let (control, requests) = channel::channel::<ControlMessage>();
        event_loop
            .handle()
            .insert_source(requests, |event, _, session: &mut Session<D>| match event {
                channel::Event::Msg(message) => dispatch_message(&mut session.compositor, message),
                channel::Event::Closed => tracing::debug!("Control channel closed"),
            })
            .map_err(|err| err.error)?;

        Ok(Self {
            session: Session { compositor },
            event_loop,
            control,
            shutdown: Arc::new(AtomicBool::new(false)),
            subscribers: Vec::new(),
        })
    }

    /// Sender for control requests, usable from other threads.
    pub fn control_sender(&self) -> Sender<ControlMessage> {
        self.control.clone()
    }

    pub fn compositor(&self) -> &Compositor<D> {
        &self.session.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor<D> {
        &mut self.session.compositor
    }

    /// Receives every compositor event from now on. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::Receiver<CompositorEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Flag that stops [`Runtime::run`] once set.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn install_signal_handlers(&self) -> Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.shutdown))?;
        }
        Ok(())
    }

    /// One loop iteration, then any display events it produced.
    pub fn dispatch(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.event_loop.dispatch(timeout, &mut self.session)?;
        self.session.compositor.dispatch_display_events();
        self.publish_events();
        Ok(())
    }

    fn publish_events(&mut self) {
        for event in self.session.compositor.take_events() {
            match &event {
                CompositorEvent::CompositingToggled(active) => {
                    tracing::debug!(active, "Compositing toggled");
                }
                CompositorEvent::SuspendedNotice { message } => {
                    tracing::info!(notice = %message, "Compositing suspended remotely");
                }
            }
            self.subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
        }
    }

    /// Runs until the shutdown flag is raised.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("Compositing event loop running");
        while !self.shutdown.load(Ordering::SeqCst) {
            self.dispatch(Some(POLL_INTERVAL))?;
        }
        tracing::info!("Shutdown requested, leaving event loop");
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.session.compositor.shutdown();
        self.publish_events();
    }
}
