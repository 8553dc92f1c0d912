mod common;

use std::time::Duration;

use common::{client, config, harness, harness_with, screen};
use novade_compositing::compositor::{CompositorEvent, CompositorState};
use novade_compositing::display::{Atom, Extension, HeadlessDisplay, ScreenLayout, WindowId};
use novade_compositing::suspend::SuspendReason;
use novade_compositing::timer::TimerId;
use novade_compositing::window::{ClientState, Toplevel};
use novade_core::types::Rect;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[derive(Debug, Clone, Copy)]
enum Op {
    Suspend(SuspendReason),
    Resume(SuspendReason),
}

const USER: SuspendReason = SuspendReason::USER_REQUESTED;
const RULE: SuspendReason = SuspendReason::RULE_BLOCKED;
const SCRIPT: SuspendReason = SuspendReason::SCRIPT_REQUESTED;

#[rstest]
#[case(&[Op::Suspend(USER), Op::Suspend(RULE), Op::Resume(USER), Op::Resume(RULE)])]
#[case(&[Op::Suspend(RULE), Op::Suspend(USER), Op::Resume(RULE), Op::Resume(USER)])]
#[case(&[Op::Suspend(SCRIPT), Op::Resume(USER), Op::Suspend(USER), Op::Resume(SCRIPT)])]
#[case(&[Op::Suspend(USER), Op::Suspend(USER), Op::Resume(USER)])]
#[case(&[Op::Suspend(SuspendReason::ALL), Op::Resume(RULE), Op::Resume(SCRIPT), Op::Resume(USER)])]
fn test_active_exactly_when_no_reason_held(#[case] ops: &[Op]) {
    let mut h = harness(config());
    h.compositor.setup();
    assert!(h.compositor.is_active());

    for op in ops {
        match *op {
            Op::Suspend(reason) => h.compositor.suspend(reason),
            Op::Resume(reason) => h.compositor.resume(reason),
        }
        assert_eq!(
            h.compositor.is_active(),
            h.compositor.suspend_reasons().is_empty(),
            "after {op:?}"
        );
    }
}

#[rstest]
#[case(&[Op::Suspend(USER), Op::Suspend(SCRIPT), Op::Resume(USER)])]
#[case(&[Op::Suspend(SCRIPT), Op::Resume(USER), Op::Suspend(USER), Op::Resume(USER)])]
#[case(&[Op::Resume(USER), Op::Suspend(SCRIPT)])]
fn test_reason_order_does_not_matter(#[case] ops: &[Op]) {
    let mut h = harness(config());
    h.compositor.setup();
    for op in ops {
        match *op {
            Op::Suspend(reason) => h.compositor.suspend(reason),
            Op::Resume(reason) => h.compositor.resume(reason),
        }
    }
    // Every sequence above nets out to the script reason alone.
    assert_eq!(h.compositor.suspend_reasons(), SCRIPT);
    assert_eq!(h.compositor.state(), CompositorState::Inactive);
    assert!(h.compositor.scene().is_none());
}

#[test]
fn test_damage_objects_follow_setup_and_finish() {
    let mut h = harness(config());
    for id in 1..=3 {
        h.compositor.add_window(client(id, Rect::from_coords(0, 0, 100, 100)));
    }
    assert_eq!(h.compositor.display().damages_created(), 0);

    h.compositor.setup();
    assert_eq!(h.compositor.display().live_damage_count(), 3);

    h.compositor.finish();
    assert_eq!(h.compositor.display().live_damage_count(), 0);
    assert_eq!(h.compositor.display().damages_destroyed(), 3);
    assert!(h.compositor.windows().iter().all(|w| !w.has_damage_handle()));

    h.compositor.setup();
    let display = h.compositor.display();
    assert_eq!(display.damages_created(), 6);
    assert_eq!(display.live_damage_count(), 3);
    for id in 1..=3 {
        assert!(display.has_damage_for(WindowId(id)));
    }
}

#[test]
fn test_missing_extension_keeps_everything_untouched() {
    let display = HeadlessDisplay::new(
        &[Extension::Fixes, Extension::Damage, Extension::Render],
        ScreenLayout::single(common::WIDTH, common::HEIGHT),
    );
    let mut h = harness_with(display, config());
    h.compositor.setup();

    assert_eq!(h.compositor.state(), CompositorState::Inactive);
    assert!(!h.compositor.is_compositing_possible());
    assert!(!h.compositor.compositing_not_possible_reason().is_empty());
    assert_eq!(h.log.borrow().created, 0);
    assert_eq!(h.compositor.display().claim_attempts(), 0);
    assert!(h.compositor.take_events().is_empty());
}

#[test]
fn test_scene_failure_rolls_back() {
    let mut h = harness(config());
    h.compositor.add_window(client(1, screen()));
    h.fail_scene.set(true);
    h.compositor.setup();

    assert_eq!(h.compositor.state(), CompositorState::Inactive);
    let display = h.compositor.display();
    assert_eq!(display.claim_attempts(), 1);
    assert_eq!(display.selection_owner(), None);
    assert!(!display.subwindows_redirected());
    assert_eq!(display.live_damage_count(), 0);

    h.fail_scene.set(false);
    h.compositor.setup();
    assert!(h.compositor.is_active());
    assert_eq!(h.compositor.display().selection_owner(), Some("_NET_WM_CM_S0"));
    assert_eq!(h.compositor.display().live_damage_count(), 1);
}

#[test]
fn test_refused_selection_stays_inactive() {
    let mut h = harness(config());
    h.compositor.display_mut().set_refuse_selection(true);
    h.compositor.setup();
    assert_eq!(h.compositor.state(), CompositorState::Inactive);
    assert_eq!(h.log.borrow().created, 0);
}

#[test]
fn test_losing_selection_finishes() {
    let mut h = harness(config());
    h.compositor.setup();
    h.compositor.take_events();

    h.compositor.display_mut().steal_selection("other-manager");
    h.settle();

    assert_eq!(h.compositor.state(), CompositorState::Inactive);
    assert!(h.compositor.suspend_reasons().is_empty());
    assert!(!h.compositor.display().subwindows_redirected());
    assert_eq!(h.compositor.take_events(), vec![CompositorEvent::CompositingToggled(false)]);
}

#[test]
fn test_blocking_window_suspends_on_next_turn() {
    let mut h = harness(config());
    h.compositor.setup();
    let blocker = Toplevel::client(
        WindowId(5),
        Rect::from_coords(0, 0, 200, 200),
        ClientState {
            blocks_compositing: true,
            ..ClientState::default()
        },
    );
    h.compositor.add_window(blocker);
    // Nothing happens inside the window-management call itself.
    assert!(h.compositor.is_active());

    h.settle();
    assert!(!h.compositor.is_active());
    assert_eq!(h.compositor.suspend_reasons(), SuspendReason::RULE_BLOCKED);

    assert!(h.compositor.remove_window(WindowId(5), false));
    assert!(!h.compositor.is_active());
    h.settle();
    assert!(h.compositor.is_active());
    assert!(h.compositor.suspend_reasons().is_empty());
}

#[test]
fn test_unblocking_keeps_other_blockers_in_charge() {
    let mut h = harness(config());
    h.compositor.setup();
    let blocking = ClientState {
        blocks_compositing: true,
        ..ClientState::default()
    };
    h.compositor.add_window(Toplevel::client(WindowId(1), screen(), blocking));
    h.compositor.add_window(Toplevel::client(WindowId(2), screen(), blocking));
    h.settle();
    assert!(!h.compositor.is_active());

    h.compositor.set_client_state(WindowId(1), ClientState::default());
    h.settle();
    assert!(!h.compositor.is_active());

    h.compositor.set_client_state(WindowId(2), ClientState::default());
    h.settle();
    assert!(h.compositor.is_active());
}

#[test]
fn test_reinitialize_forgets_reasons() {
    let mut h = harness(config());
    h.compositor.setup();
    h.compositor.suspend(SuspendReason::USER_REQUESTED | SuspendReason::SCRIPT_REQUESTED);
    assert!(!h.compositor.is_active());

    h.compositor.reinitialize(config());
    assert!(h.compositor.is_active());
    assert!(h.compositor.suspend_reasons().is_empty());
}

#[test]
fn test_restart_sets_up_on_next_turn() {
    let mut h = harness(config());
    h.compositor.setup();
    h.compositor.restart();

    assert_eq!(h.compositor.state(), CompositorState::Starting);
    assert!(!h.compositor.is_active());
    h.settle();
    assert!(h.compositor.is_active());
    assert_eq!(h.log.borrow().created, 2);
}

#[test]
fn test_scheduled_restart_fires_after_delay() {
    let mut h = harness(config());
    h.compositor.setup();
    h.compositor.schedule_restart(Duration::from_millis(500));

    h.advance(Duration::from_millis(499));
    assert_eq!(h.log.borrow().created, 1);
    h.advance(Duration::from_millis(1));
    assert!(h.compositor.is_active());
    assert_eq!(h.log.borrow().created, 2);
}

#[test]
fn test_support_sweep_waits_for_restart() {
    let mut h = harness(config());
    h.compositor.display_mut().set_root_property(Atom(42));
    h.compositor.setup();

    // Both timers expire at the same instant; the restart was armed first.
    h.compositor.schedule_restart(Duration::from_secs(2));
    h.compositor.remove_support_property(Atom(42));

    h.advance(Duration::from_secs(2));
    assert!(h.compositor.is_active());
    assert!(h.compositor.display().has_root_property(Atom(42)));

    h.advance(Duration::from_secs(2));
    assert!(!h.compositor.display().has_root_property(Atom(42)));
}

#[test]
fn test_kept_support_property_survives_sweep() {
    let mut h = harness(config());
    h.compositor.display_mut().set_root_property(Atom(7));
    h.compositor.display_mut().set_root_property(Atom(8));
    h.compositor.remove_support_property(Atom(7));
    h.compositor.remove_support_property(Atom(8));
    h.compositor.keep_support_property(Atom(7));

    h.advance(Duration::from_secs(2));
    assert!(h.compositor.display().has_root_property(Atom(7)));
    assert!(!h.compositor.display().has_root_property(Atom(8)));
}

#[test]
fn test_shutdown_sweeps_immediately() {
    let mut h = harness(config());
    h.compositor.display_mut().set_root_property(Atom(3));
    h.compositor.setup();
    h.compositor.remove_support_property(Atom(3));

    h.compositor.shutdown();
    assert!(!h.compositor.is_active());
    assert!(!h.compositor.display().has_root_property(Atom(3)));
    assert_eq!(h.timers.remaining(TimerId::SupportSweep), None);
}

#[test]
fn test_finish_forwards_translucency() {
    let mut h = harness(config());
    h.compositor.add_window(client(1, screen()).with_opacity(0.5));
    h.compositor.add_window(client(2, screen()));
    h.compositor.setup();
    assert_eq!(h.compositor.display().opacity_of(WindowId(1)), None);

    h.compositor.finish();
    assert_eq!(h.compositor.display().opacity_of(WindowId(1)), Some(0.5));
    assert_eq!(h.compositor.display().opacity_of(WindowId(2)), None);
}

#[test]
fn test_reconfigure_respects_suspension() {
    let mut h = harness(config());
    h.compositor.reconfigure(config());
    assert!(h.compositor.is_active());

    h.compositor.suspend(SuspendReason::USER_REQUESTED);
    h.compositor.reconfigure(config());
    assert!(!h.compositor.is_active());
}
