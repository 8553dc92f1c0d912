mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use common::{client, config, harness, screen, Harness, RecordingSceneFactory, SceneLog};
use novade_compositing::compositor::Compositor;
use novade_compositing::display::{
    Atom, DamageFetch, DamageHandle, DamageReply, DisplayConnection, DisplayEvent, Extension, HeadlessDisplay,
    ScreenLayout, WindowId,
};
use novade_compositing::error::DisplayError;
use novade_compositing::timer::{ManualTimers, TimerId};
use novade_compositing::window::Toplevel;
use novade_core::types::{Point, Rect, Region};
use pretty_assertions::assert_eq;

fn active() -> Harness {
    let mut h = harness(config());
    h.compositor.setup();
    h
}

#[test]
fn test_setup_paints_full_screen_once() {
    let h = active();
    let log = h.log.borrow();
    assert_eq!(log.paints.len(), 1);
    assert_eq!(log.paints[0].damage.area(), screen().area());
    assert!(h.compositor.pending_repaints().is_empty());
}

#[test]
fn test_next_frame_accounts_for_paint_time() {
    let h = active();
    // 60 Hz interval minus the 4 ms the scene reported.
    assert_eq!(h.timers.remaining(TimerId::Repaint), Some(Duration::from_millis(12)));
}

#[test]
fn test_idle_is_reported_once() {
    let mut h = active();
    h.advance(Duration::from_millis(20));
    assert_eq!(h.log.borrow().idles, 1);
    assert_eq!(h.timers.remaining(TimerId::Repaint), None);

    h.advance(Duration::from_secs(1));
    assert_eq!(h.log.borrow().idles, 1);
    assert_eq!(h.log.borrow().paints.len(), 1);
}

#[test]
fn test_hidden_overlay_suppresses_painting() {
    let mut h = active();
    h.compositor.set_overlay_window_visibility(false);
    h.compositor.add_repaint(&Region::from_rect(Rect::from_coords(0, 0, 50, 50)));
    h.advance(Duration::from_millis(100));
    assert_eq!(h.log.borrow().paints.len(), 1);

    h.compositor.set_overlay_window_visibility(true);
    h.advance(Duration::from_millis(100));
    let log = h.log.borrow();
    assert_eq!(log.paints.len(), 2);
    assert_eq!(log.paints[1].damage.area(), screen().area());
}

#[test]
fn test_damaged_client_becomes_paintable() {
    let mut h = active();
    h.compositor.add_window(client(10, Rect::from_coords(100, 100, 200, 100)));
    h.advance(Duration::from_millis(20));
    assert_eq!(h.log.borrow().paints.len(), 1);
    assert!(!h.compositor.window(WindowId(10)).unwrap().is_ready_for_painting());

    h.damage(WindowId(10), &[Rect::from_coords(0, 0, 10, 10)]);
    h.advance(Duration::from_millis(20));

    let log = h.log.borrow();
    assert_eq!(log.paints.len(), 2);
    assert_eq!(log.paints[1].windows, vec![WindowId(10)]);
    assert!(log.paints[1].damage.is_empty());
    assert_eq!(h.compositor.display().fetch_requests(), 1);
}

#[test]
fn test_unready_clients_are_skipped() {
    let mut h = active();
    h.compositor.add_window(client(1, screen()));
    h.compositor.add_window(Toplevel::unmanaged(WindowId(2), Rect::from_coords(0, 0, 300, 40)));
    h.advance(Duration::from_millis(20));

    let log = h.log.borrow();
    assert_eq!(log.paints.last().unwrap().windows, vec![WindowId(2)]);
}

#[test]
fn test_elevated_windows_paint_last() {
    let mut h = active();
    for id in [1, 2, 3] {
        h.compositor.add_window(Toplevel::unmanaged(WindowId(id), Rect::from_coords(0, 0, 100, 100)));
    }
    h.log.borrow_mut().elevated = vec![WindowId(1)];
    h.compositor.add_repaint_full();
    h.advance(Duration::from_millis(20));

    assert_eq!(
        h.log.borrow().paints.last().unwrap().windows,
        vec![WindowId(2), WindowId(3), WindowId(1)]
    );
    // Painting order does not change the stack.
    assert_eq!(h.compositor.windows().order(), &[WindowId(1), WindowId(2), WindowId(3)]);
}

#[test]
fn test_repaint_without_scene_is_dropped() {
    let mut h = harness(config());
    h.compositor.add_repaint_full();
    h.compositor.schedule_repaint();
    assert!(h.compositor.pending_repaints().is_empty());
    assert_eq!(h.timers.remaining(TimerId::Repaint), None);
}

#[test]
fn test_resize_discards_contents_move_does_not() {
    let mut h = active();
    h.compositor.add_window(client(1, Rect::from_coords(0, 0, 100, 100)));

    h.compositor.set_window_geometry(WindowId(1), Rect::from_coords(50, 50, 100, 100));
    assert_eq!(h.log.borrow().discards_of(WindowId(1)), 0);
    let pending = h.compositor.pending_repaints();
    assert!(pending.contains_point(Point::new(10, 10)));
    assert!(pending.contains_point(Point::new(140, 140)));

    h.compositor.set_window_geometry(WindowId(1), Rect::from_coords(50, 50, 300, 100));
    assert_eq!(h.log.borrow().discards_of(WindowId(1)), 1);
}

#[test]
fn test_placeholder_lives_until_discarded() {
    let mut h = active();
    h.compositor.add_window(client(1, screen()));
    h.compositor.add_window(client(2, screen()));

    assert!(h.compositor.remove_window(WindowId(1), true));
    assert_eq!(h.log.borrow().closed, vec![(WindowId(1), true)]);
    let placeholder = h.compositor.window(WindowId(1)).unwrap();
    assert!(placeholder.is_deleted());
    assert!(!placeholder.has_damage_handle());
    assert_eq!(h.compositor.windows().order(), &[WindowId(1), WindowId(2)]);
    assert!(!h.compositor.remove_window(WindowId(1), true));

    assert!(h.compositor.discard_placeholder(WindowId(1)));
    assert_eq!(h.log.borrow().deleted, vec![WindowId(1)]);
    assert!(h.compositor.window(WindowId(1)).is_none());
    assert!(!h.compositor.discard_placeholder(WindowId(2)));
}

#[test]
fn test_finish_drops_placeholders() {
    let mut h = active();
    h.compositor.add_window(client(1, screen()));
    h.compositor.remove_window(WindowId(1), true);
    h.compositor.finish();

    assert_eq!(h.log.borrow().deleted, vec![WindowId(1)]);
    assert!(h.compositor.windows().is_empty());
}

#[test]
fn test_damage_for_unknown_window_is_ignored() {
    let mut h = active();
    h.compositor.handle_display_event(DisplayEvent::DamageNotify { window: WindowId(404) });
    h.advance(Duration::from_millis(20));
    assert_eq!(h.log.borrow().paints.len(), 1);
}

/// Wraps the headless display and records the order of damage calls.
struct OrderingDisplay {
    inner: HeadlessDisplay,
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl DisplayConnection for OrderingDisplay {
    fn has_extension(&self, extension: Extension) -> bool {
        self.inner.has_extension(extension)
    }

    fn screen_layout(&self) -> ScreenLayout {
        self.inner.screen_layout()
    }

    fn refresh_rate(&self) -> Option<u32> {
        self.inner.refresh_rate()
    }

    fn claim_selection(&mut self, selection: &str) -> Result<(), DisplayError> {
        self.inner.claim_selection(selection)
    }

    fn release_selection(&mut self, selection: &str) {
        self.inner.release_selection(selection)
    }

    fn redirect_subwindows(&mut self) -> Result<(), DisplayError> {
        self.inner.redirect_subwindows()
    }

    fn unredirect_subwindows(&mut self) {
        self.inner.unredirect_subwindows()
    }

    fn redirect_window(&mut self, window: WindowId) {
        self.inner.redirect_window(window)
    }

    fn unredirect_window(&mut self, window: WindowId) {
        self.inner.unredirect_window(window)
    }

    fn create_damage(&mut self, window: WindowId) -> Result<DamageHandle, DisplayError> {
        self.inner.create_damage(window)
    }

    fn destroy_damage(&mut self, damage: DamageHandle) {
        self.inner.destroy_damage(damage)
    }

    fn request_damage_region(&mut self, damage: DamageHandle) -> Result<DamageFetch, DisplayError> {
        self.calls.borrow_mut().push("request");
        self.inner.request_damage_region(damage)
    }

    fn damage_region_reply(&mut self, fetch: DamageFetch) -> Option<DamageReply> {
        self.calls.borrow_mut().push("reply");
        self.inner.damage_region_reply(fetch)
    }

    fn discard_damage_reply(&mut self, fetch: DamageFetch) {
        self.inner.discard_damage_reply(fetch)
    }

    fn flush(&mut self) {
        self.calls.borrow_mut().push("flush");
        self.inner.flush()
    }

    fn delete_root_property(&mut self, atom: Atom) {
        self.inner.delete_root_property(atom)
    }

    fn set_window_opacity(&mut self, window: WindowId, opacity: f64) {
        self.inner.set_window_opacity(window, opacity)
    }

    fn poll_event(&mut self) -> Option<DisplayEvent> {
        self.inner.poll_event()
    }
}

#[test]
fn test_all_fetches_issued_before_any_reply() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let display = OrderingDisplay {
        inner: HeadlessDisplay::with_all_extensions(common::WIDTH, common::HEIGHT),
        calls: Rc::clone(&calls),
    };
    let log = Rc::new(RefCell::new(SceneLog::default()));
    let timers = ManualTimers::new();
    let mut compositor = Compositor::new(
        display,
        Box::new(RecordingSceneFactory::new(Rc::clone(&log))),
        Box::new(timers.clone()),
        config(),
    );
    compositor.setup();
    for id in [1, 2, 3] {
        compositor.add_window(client(id, Rect::from_coords(0, 0, 64, 64)));
    }
    for id in [1, 2, 3] {
        compositor.display_mut().inner.report_damage(WindowId(id), &[Rect::from_coords(0, 0, 8, 8)]);
    }
    compositor.dispatch_display_events();
    calls.borrow_mut().clear();

    compositor.perform_compositing();

    assert_eq!(
        *calls.borrow(),
        vec!["request", "request", "request", "flush", "reply", "reply", "reply"]
    );
    assert_eq!(log.borrow().paints.last().unwrap().windows.len(), 3);
}
