//! Shared fixtures: a scene that records every call, and a harness that
//! drives the compositor on a virtual clock.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use novade_compositing::compositor::Compositor;
use novade_compositing::display::{DisplayConnection, HeadlessDisplay, WindowId};
use novade_compositing::error::SceneError;
use novade_compositing::scene::{OverlayWindow, PaintTiming, Scene, SceneFactory, WindowPaintInfo};
use novade_compositing::timer::{ManualTimers, TimerQueue};
use novade_compositing::window::{ClientState, Toplevel};
use novade_core::config::{CompositingBackend, CompositingConfig};
use novade_core::types::{Rect, Region};

pub const OVERLAY: WindowId = WindowId(900);
pub const WIDTH: u32 = 1920;
pub const HEIGHT: u32 = 1080;

#[derive(Debug, Clone, PartialEq)]
pub struct PaintRecord {
    pub damage: Region,
    pub windows: Vec<WindowId>,
}

#[derive(Debug, Default)]
pub struct SceneLog {
    pub created: usize,
    pub added: Vec<WindowId>,
    pub closed: Vec<(WindowId, bool)>,
    pub deleted: Vec<WindowId>,
    pub discarded: Vec<WindowId>,
    pub paints: Vec<PaintRecord>,
    pub idles: usize,
    pub overlay_visible: bool,
    pub overlay_shape: Option<Region>,
    pub elevated: Vec<WindowId>,
    pub fullscreen_effect: bool,
}

impl SceneLog {
    pub fn discards_of(&self, window: WindowId) -> usize {
        self.discarded.iter().filter(|w| **w == window).count()
    }
}

struct RecordingOverlay {
    log: Rc<RefCell<SceneLog>>,
}

impl OverlayWindow for RecordingOverlay {
    fn window(&self) -> Option<WindowId> {
        Some(OVERLAY)
    }

    fn is_visible(&self) -> bool {
        self.log.borrow().overlay_visible
    }

    fn set_visibility(&mut self, visible: bool) {
        self.log.borrow_mut().overlay_visible = visible;
    }

    fn set_shape(&mut self, shape: &Region) {
        self.log.borrow_mut().overlay_shape = Some(shape.clone());
    }
}

pub struct RecordingScene {
    backend: CompositingBackend,
    log: Rc<RefCell<SceneLog>>,
    overlay: RecordingOverlay,
}

impl Scene for RecordingScene {
    fn compositing_type(&self) -> CompositingBackend {
        self.backend
    }

    fn paint(&mut self, damage: &Region, windows: &[WindowPaintInfo]) -> PaintTiming {
        self.log.borrow_mut().paints.push(PaintRecord {
            damage: damage.clone(),
            windows: windows.iter().map(|w| w.id).collect(),
        });
        PaintTiming {
            since_last_vblank: Duration::from_millis(4),
        }
    }

    fn window_added(&mut self, window: WindowId) {
        self.log.borrow_mut().added.push(window);
    }

    fn window_closed(&mut self, window: WindowId, placeholder: bool) {
        self.log.borrow_mut().closed.push((window, placeholder));
    }

    fn window_deleted(&mut self, window: WindowId) {
        self.log.borrow_mut().deleted.push(window);
    }

    fn pixmap_discarded(&mut self, window: WindowId) {
        self.log.borrow_mut().discarded.push(window);
    }

    fn idle(&mut self) {
        self.log.borrow_mut().idles += 1;
    }

    fn elevated_windows(&self) -> Vec<WindowId> {
        self.log.borrow().elevated.clone()
    }

    fn has_active_fullscreen_effect(&self) -> bool {
        self.log.borrow().fullscreen_effect
    }

    fn overlay(&self) -> &dyn OverlayWindow {
        &self.overlay
    }

    fn overlay_mut(&mut self) -> &mut dyn OverlayWindow {
        &mut self.overlay
    }
}

pub struct RecordingSceneFactory {
    log: Rc<RefCell<SceneLog>>,
    fail: Rc<Cell<bool>>,
}

impl RecordingSceneFactory {
    pub fn new(log: Rc<RefCell<SceneLog>>) -> Self {
        Self {
            log,
            fail: Rc::new(Cell::new(false)),
        }
    }
}

impl SceneFactory for RecordingSceneFactory {
    fn create(
        &mut self,
        backend: CompositingBackend,
        _display: &dyn DisplayConnection,
    ) -> Result<Box<dyn Scene>, SceneError> {
        if self.fail.get() {
            return Err(SceneError::InitFailed("renderer refused to start".to_string()));
        }
        {
            let mut log = self.log.borrow_mut();
            log.created += 1;
            log.overlay_visible = true;
        }
        Ok(Box::new(RecordingScene {
            backend,
            log: Rc::clone(&self.log),
            overlay: RecordingOverlay {
                log: Rc::clone(&self.log),
            },
        }))
    }
}

pub struct Harness {
    pub compositor: Compositor<HeadlessDisplay>,
    pub timers: ManualTimers,
    pub log: Rc<RefCell<SceneLog>>,
    pub fail_scene: Rc<Cell<bool>>,
}

pub fn config() -> CompositingConfig {
    CompositingConfig::default()
}

pub fn unredirect_config() -> CompositingConfig {
    CompositingConfig {
        unredirect_fullscreen: true,
        ..CompositingConfig::default()
    }
}

pub fn harness_with(display: HeadlessDisplay, config: CompositingConfig) -> Harness {
    let timers = ManualTimers::new();
    let log = Rc::new(RefCell::new(SceneLog::default()));
    let fail_scene = Rc::new(Cell::new(false));
    let mut factory = RecordingSceneFactory::new(Rc::clone(&log));
    factory.fail = Rc::clone(&fail_scene);
    let compositor = Compositor::new(display, Box::new(factory), Box::new(timers.clone()), config);
    Harness {
        compositor,
        timers,
        log,
        fail_scene,
    }
}

pub fn harness(config: CompositingConfig) -> Harness {
    harness_with(HeadlessDisplay::with_all_extensions(WIDTH, HEIGHT), config)
}

impl Harness {
    /// Delivers queued display events, then fires every timer due within `by`.
    pub fn advance(&mut self, by: Duration) {
        self.compositor.dispatch_display_events();
        let target = self.timers.now() + by;
        while let Some(id) = self.timers.pop_due(target) {
            self.compositor.handle_timer(id);
            self.compositor.dispatch_display_events();
        }
        self.timers.advance_to(target);
    }

    /// Runs everything armed with a zero delay.
    pub fn settle(&mut self) {
        self.advance(Duration::ZERO);
    }

    pub fn damage(&mut self, window: WindowId, rects: &[Rect]) {
        self.compositor.display_mut().report_damage(window, rects);
        self.compositor.dispatch_display_events();
    }
}

pub fn screen() -> Rect {
    Rect::from_coords(0, 0, WIDTH, HEIGHT)
}

pub fn fullscreen_client(id: u32) -> Toplevel {
    Toplevel::client(
        WindowId(id),
        screen(),
        ClientState {
            active: true,
            fullscreen: true,
            blocks_compositing: false,
        },
    )
}

pub fn client(id: u32, geometry: Rect) -> Toplevel {
    Toplevel::client(WindowId(id), geometry, ClientState::default())
}
