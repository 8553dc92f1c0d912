//! # NovaDE Compositing (`novade-compositing`)
//!
//! Decides whether, when and what to redraw for a stack of redirected
//! windows:
//!
//! - [`capability`]: can this display composite at all?
//! - [`window`]: per-window damage tracking and the unredirect optimisation.
//! - [`frame`]: repaint pacing against the display's refresh interval.
//! - [`support`]: delayed removal of root-window support properties.
//! - [`compositor`]: the suspend/resume state machine tying it all together.
//! - [`control`] and [`runtime`]: the remote-control surface and the calloop
//!   loop that drives everything. With the `dbus` feature, `dbus` exposes the
//!   control surface on the session bus.
//!
//! Rendering and the display protocol are seams ([`scene::Scene`],
//! [`display::DisplayConnection`]) with headless implementations.
//!
//! ```
//! use novade_compositing::compositor::Compositor;
//! use novade_compositing::display::{HeadlessDisplay, WindowId};
//! use novade_compositing::scene::HeadlessSceneFactory;
//! use novade_compositing::timer::ManualTimers;
//! use novade_core::config::CompositingConfig;
//!
//! let mut compositor = Compositor::new(
//!     HeadlessDisplay::with_all_extensions(1920, 1080),
//!     Box::new(HeadlessSceneFactory::new(WindowId(1))),
//!     Box::new(ManualTimers::new()),
//!     CompositingConfig::default(),
//! );
//! compositor.setup();
//! assert!(compositor.is_active());
//! assert_eq!(compositor.compositing_type(), "xrender");
//! ```

pub mod capability;
pub mod compositor;
pub mod control;
#[cfg(feature = "dbus")]
pub mod dbus;
pub mod display;
pub mod error;
pub mod frame;
pub mod runtime;
pub mod scene;
pub mod support;
pub mod suspend;
pub mod timer;
pub mod window;

pub use compositor::{Compositor, CompositorEvent, CompositorState};
pub use error::{CompositingError, DisplayError, Result, SceneError};
pub use suspend::SuspendReason;
