//! Compositing capability probe.
//!
//! A pure function of the connected display: it is cheap enough to run on
//! every (re)start attempt and has no side effects.

use std::fmt;

use crate::display::{DisplayConnection, Extension};

/// The first capability found missing, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCapability {
    RegionFixes,
    DamageReporting,
    Redirection,
    Renderer,
}

impl fmt::Display for MissingCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            MissingCapability::RegionFixes => "Required X extension (XFixes) is not available.",
            MissingCapability::DamageReporting | MissingCapability::Redirection => {
                "Required X extensions (XComposite and XDamage) are not available."
            }
            MissingCapability::Renderer => "GLX/OpenGL and XRender are not available.",
        };
        f.write_str(reason)
    }
}

/// Checks region fixes, damage, redirection and a renderer, in that order.
///
/// # Examples
///
/// ```
/// use novade_compositing::capability::{probe, MissingCapability};
/// use novade_compositing::display::{Extension, HeadlessDisplay, ScreenLayout};
///
/// let display = HeadlessDisplay::new(
///     &[Extension::Fixes, Extension::Damage, Extension::Composite],
///     ScreenLayout::single(1024, 768),
/// );
/// assert_eq!(probe(&display), Err(MissingCapability::Renderer));
/// ```
pub fn probe(display: &dyn DisplayConnection) -> Result<(), MissingCapability> {
    if !display.has_extension(Extension::Fixes) {
        return Err(MissingCapability::RegionFixes);
    }
    if !display.has_extension(Extension::Damage) {
        return Err(MissingCapability::DamageReporting);
    }
    if !display.has_extension(Extension::Composite) {
        return Err(MissingCapability::Redirection);
    }
    if !(display.has_extension(Extension::Glx) || display.has_extension(Extension::Render)) {
        return Err(MissingCapability::Renderer);
    }
    Ok(())
}

pub fn is_possible(display: &dyn DisplayConnection) -> bool {
    probe(display).is_ok()
}

/// Human-readable blocking reason; empty when compositing is possible.
pub fn reason_unavailable(display: &dyn DisplayConnection) -> String {
    match probe(display) {
        Ok(()) => String::new(),
        Err(missing) => missing.to_string(),
    }
}
