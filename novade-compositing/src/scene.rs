//! The renderer seam.
//!
//! A [`Scene`] draws a list of windows into a damaged region of the overlay
//! window and reports how long after the last vblank it finished. Everything
//! about actual pixels (pixmaps, textures, shaders) stays behind this trait;
//! the compositor only tells the scene when windows appear, disappear or lose
//! their cached contents.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use novade_core::config::CompositingBackend;
use novade_core::types::{Rect, Region};

use crate::display::{DisplayConnection, WindowId};
use crate::error::SceneError;

/// What a paint pass reports back for frame pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintTiming {
    /// Time from the last vertical blank to the end of the paint.
    pub since_last_vblank: Duration,
}

/// One entry of the paint list, bottom to top.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPaintInfo {
    pub id: WindowId,
    pub geometry: Rect,
    pub opacity: f64,
    /// Accumulated damage, window-local.
    pub damage: Region,
    /// Pending repaints, screen coordinates.
    pub repaints: Region,
    pub unredirected: bool,
}

/// The full-screen surface the composed image is presented on.
pub trait OverlayWindow {
    /// Protocol handle, used to recognise events the compositor caused itself.
    fn window(&self) -> Option<WindowId>;
    fn is_visible(&self) -> bool;
    fn set_visibility(&mut self, visible: bool);
    /// Restricts the overlay to `shape` so unredirected windows show through.
    fn set_shape(&mut self, shape: &Region);
}

pub trait Scene {
    /// Renderer family actually in use.
    fn compositing_type(&self) -> CompositingBackend;

    /// Whether painting is aligned to the display's vertical blank.
    fn syncs_to_vblank(&self) -> bool {
        false
    }

    fn paint(&mut self, damage: &Region, windows: &[WindowPaintInfo]) -> PaintTiming;

    fn window_added(&mut self, window: WindowId);

    /// `placeholder` is set when the window lives on as a deleted placeholder.
    fn window_closed(&mut self, window: WindowId, placeholder: bool);

    fn window_deleted(&mut self, window: WindowId);

    /// The cached contents of `window` are stale and must be re-captured.
    fn pixmap_discarded(&mut self, window: WindowId);

    /// Nothing was painted this frame.
    fn idle(&mut self) {}

    /// Windows that effects want painted above the normal stacking order.
    fn elevated_windows(&self) -> Vec<WindowId> {
        Vec::new()
    }

    /// A full-screen effect is running; no window may bypass compositing.
    fn has_active_fullscreen_effect(&self) -> bool {
        false
    }

    fn overlay(&self) -> &dyn OverlayWindow;
    fn overlay_mut(&mut self) -> &mut dyn OverlayWindow;
}

/// Builds scenes on `setup()`.
pub trait SceneFactory {
    fn create(
        &mut self,
        backend: CompositingBackend,
        display: &dyn DisplayConnection,
    ) -> Result<Box<dyn Scene>, SceneError>;
}

#[derive(Debug, Clone)]
pub struct HeadlessOverlay {
    window: WindowId,
    visible: bool,
    shape: Region,
}

impl HeadlessOverlay {
    pub fn new(window: WindowId, bounds: Rect) -> Self {
        Self {
            window,
            visible: true,
            shape: Region::from_rect(bounds),
        }
    }

    pub fn shape(&self) -> &Region {
        &self.shape
    }
}

impl OverlayWindow for HeadlessOverlay {
    fn window(&self) -> Option<WindowId> {
        Some(self.window)
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_shape(&mut self, shape: &Region) {
        self.shape = shape.clone();
    }
}

/// Scene that tracks windows and frames but draws nothing.
#[derive(Debug)]
pub struct HeadlessScene {
    backend: CompositingBackend,
    overlay: HeadlessOverlay,
    windows: HashSet<WindowId>,
    frames: u64,
    last_vblank: Instant,
    frame_period: Duration,
}

impl HeadlessScene {
    pub fn new(backend: CompositingBackend, overlay: HeadlessOverlay, refresh_rate: u32) -> Self {
        Self {
            backend,
            overlay,
            windows: HashSet::new(),
            frames: 0,
            last_vblank: Instant::now(),
            frame_period: Duration::from_nanos(1_000_000_000 / u64::from(refresh_rate.max(1))),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }
}

impl Scene for HeadlessScene {
    fn compositing_type(&self) -> CompositingBackend {
        self.backend
    }

    fn paint(&mut self, damage: &Region, windows: &[WindowPaintInfo]) -> PaintTiming {
        self.frames += 1;
        tracing::trace!(
            frame = self.frames,
            windows = windows.len(),
            damage_area = damage.area(),
            "Headless paint"
        );
        // Pretend the vblank ticks at the display's refresh rate.
        let now = Instant::now();
        let period = self.frame_period.as_nanos();
        let since = now.saturating_duration_since(self.last_vblank);
        if period > 0 && since.as_nanos() >= period {
            let into_frame = Duration::from_nanos(u64::try_from(since.as_nanos() % period).unwrap_or(u64::MAX));
            self.last_vblank = now.checked_sub(into_frame).unwrap_or(now);
        }
        PaintTiming {
            since_last_vblank: now.saturating_duration_since(self.last_vblank),
        }
    }

    fn window_added(&mut self, window: WindowId) {
        self.windows.insert(window);
    }

    fn window_closed(&mut self, window: WindowId, placeholder: bool) {
        if !placeholder {
            self.windows.remove(&window);
        }
    }

    fn window_deleted(&mut self, window: WindowId) {
        self.windows.remove(&window);
    }

    fn pixmap_discarded(&mut self, window: WindowId) {
        tracing::trace!(window = window.0, "Pixmap discarded");
    }

    fn overlay(&self) -> &dyn OverlayWindow {
        &self.overlay
    }

    fn overlay_mut(&mut self) -> &mut dyn OverlayWindow {
        &mut self.overlay
    }
}

/// Factory for [`HeadlessScene`]. Refuses the `none` backend.
#[derive(Debug, Clone)]
pub struct HeadlessSceneFactory {
    overlay_window: WindowId,
}

impl HeadlessSceneFactory {
    pub fn new(overlay_window: WindowId) -> Self {
        Self { overlay_window }
    }
}

impl SceneFactory for HeadlessSceneFactory {
    fn create(
        &mut self,
        backend: CompositingBackend,
        display: &dyn DisplayConnection,
    ) -> Result<Box<dyn Scene>, SceneError> {
        if backend == CompositingBackend::None {
            return Err(SceneError::Unsupported(backend.as_str()));
        }
        let layout = display.screen_layout();
        if layout.full.is_empty() {
            return Err(SceneError::InitFailed("display has no visible area".to_string()));
        }
        let overlay = HeadlessOverlay::new(self.overlay_window, layout.full);
        let refresh_rate = display.refresh_rate().unwrap_or(60);
        tracing::debug!(backend = backend.as_str(), refresh_rate, "Creating headless scene");
        Ok(Box::new(HeadlessScene::new(backend, overlay, refresh_rate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::HeadlessDisplay;

    #[test]
    fn test_factory_refuses_none_backend() {
        let display = HeadlessDisplay::with_all_extensions(800, 600);
        let mut factory = HeadlessSceneFactory::new(WindowId(1));
        let err = factory.create(CompositingBackend::None, &display).err();
        assert!(matches!(err, Some(SceneError::Unsupported("none"))));
    }

    #[test]
    fn test_headless_scene_tracks_windows() {
        let display = HeadlessDisplay::with_all_extensions(800, 600);
        let mut factory = HeadlessSceneFactory::new(WindowId(1));
        let mut scene = factory.create(CompositingBackend::OpenGl, &display).unwrap();
        assert_eq!(scene.compositing_type(), CompositingBackend::OpenGl);
        assert_eq!(scene.overlay().window(), Some(WindowId(1)));
        assert!(scene.overlay().is_visible());

        scene.window_added(WindowId(5));
        scene.window_closed(WindowId(5), true);
        scene.window_deleted(WindowId(5));
        let timing = scene.paint(&Region::new(), &[]);
        assert!(timing.since_last_vblank < Duration::from_secs(1));
    }

    #[test]
    fn test_vblank_catches_up_after_long_pause() {
        let overlay = HeadlessOverlay::new(WindowId(2), Rect::from_coords(0, 0, 100, 100));
        let mut scene = HeadlessScene::new(CompositingBackend::XRender, overlay, 60);
        if let Some(long_ago) = Instant::now().checked_sub(Duration::from_secs(6 * 3600)) {
            scene.last_vblank = long_ago;
        }
        let timing = scene.paint(&Region::new(), &[]);
        assert!(timing.since_last_vblank < scene.frame_period);
    }

    #[test]
    fn test_overlay_shape_replaced() {
        let mut overlay = HeadlessOverlay::new(WindowId(2), Rect::from_coords(0, 0, 100, 100));
        let shape = Region::from_rect(Rect::from_coords(0, 0, 50, 100));
        overlay.set_shape(&shape);
        assert_eq!(overlay.shape(), &shape);
    }
}
