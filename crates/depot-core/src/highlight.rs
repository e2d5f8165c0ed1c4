//! Highlight targets and the transition animator
//!
//! The interaction state decides a [`VisualParams`] target per unit; the
//! animator eases each unit's current params toward its target and only does
//! work for units still in transition.

use std::collections::{HashMap, HashSet};

use crate::interaction::InteractionState;
use crate::unit::{Availability, UnitId};

/// sRGB highlight color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Tint {
    pub const AVAILABLE: Tint = Tint { r: 0x7f, g: 0xb0, b: 0x8a };
    pub const OCCUPIED: Tint = Tint { r: 0xb9, g: 0x1c, b: 0x1c };

    /// Green for available units; red for occupied units and units without data
    pub fn for_availability(availability: Availability) -> Self {
        if availability.is_available() {
            Self::AVAILABLE
        } else {
            Self::OCCUPIED
        }
    }

    /// Channel-wise blend from `self` toward `to`, `t` in 0..=1
    pub fn blend(self, to: Tint, t: f32) -> Tint {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Tint {
            r: channel(self.r, to.r),
            g: channel(self.g, to.g),
            b: channel(self.b, to.b),
        }
    }
}

pub const HOVER_SCALE: f32 = 1.015;
pub const HOVER_GLOW: f32 = 0.08;
pub const SELECTED_SCALE: f32 = 1.03;
pub const SELECTED_GLOW: f32 = 0.15;

/// Visual state of one unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    pub scale: f32,
    /// Emissive intensity; the base color is never touched
    pub glow: f32,
    /// Emissive color
    pub tint: Option<Tint>,
}

impl VisualParams {
    pub const REST: VisualParams = VisualParams {
        scale: 1.0,
        glow: 0.0,
        tint: None,
    };

    pub fn is_rest(&self) -> bool {
        *self == Self::REST
    }

    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self {
            scale: from.scale + (to.scale - from.scale) * t,
            glow: from.glow + (to.glow - from.glow) * t,
            // Fading in or out keeps the one color while the glow ramps
            tint: match (from.tint, to.tint) {
                (Some(from), Some(to)) => Some(from.blend(to, t)),
                (from, to) => to.or(from),
            },
        }
    }
}

impl Default for VisualParams {
    fn default() -> Self {
        Self::REST
    }
}

/// Target appearance for a unit. Selection outranks hover.
pub fn highlight_target(hovered: bool, selected: bool, availability: Availability) -> VisualParams {
    let (scale, glow) = if selected {
        (SELECTED_SCALE, SELECTED_GLOW)
    } else if hovered {
        (HOVER_SCALE, HOVER_GLOW)
    } else {
        return VisualParams::REST;
    };
    VisualParams {
        scale,
        glow,
        tint: Some(Tint::for_availability(availability)),
    }
}

/// Target for `unit` under the current interaction state
pub fn target_for(state: &InteractionState, unit: &UnitId, availability: Availability) -> VisualParams {
    highlight_target(state.is_hovered(unit), state.is_selected(unit), availability)
}

/// Surface properties of a mesh before any highlight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBaseline {
    pub metallic: f32,
    pub roughness: f32,
}

/// Metallic/roughness to apply for a highlighted frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePatch {
    pub metallic: f32,
    pub roughness: f32,
}

impl SurfaceBaseline {
    /// Nudged surface for `params`, or `None` at rest (restore the baseline as-is)
    pub fn patch(&self, params: &VisualParams) -> Option<SurfacePatch> {
        if params.is_rest() {
            return None;
        }
        let amount = (params.glow / SELECTED_GLOW).clamp(0.0, 1.0);
        Some(SurfacePatch {
            metallic: (self.metallic + 0.2 * amount).min(1.0),
            roughness: (self.roughness - 0.1 * amount).max(0.0),
        })
    }
}

/// Ease-out cubic
pub fn ease_out_cubic(p: f32) -> f32 {
    let inv = 1.0 - p.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

#[derive(Debug, Clone)]
struct Track {
    start: VisualParams,
    current: VisualParams,
    target: VisualParams,
    progress: f32,
}

/// Per-unit eased transitions between highlight targets
#[derive(Debug, Clone)]
pub struct HighlightAnimator {
    duration: f32,
    tracks: HashMap<UnitId, Track>,
    active: HashSet<UnitId>,
}

impl HighlightAnimator {
    pub const DEFAULT_DURATION: f32 = 0.75;

    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration: duration_secs.max(f32::EPSILON),
            tracks: HashMap::new(),
            active: HashSet::new(),
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Point `unit` at a new target. Restarts the transition from the current
    /// params only when the target actually changes.
    pub fn retarget(&mut self, unit: &UnitId, target: VisualParams) -> bool {
        let track = self.tracks.entry(unit.clone()).or_insert(Track {
            start: VisualParams::REST,
            current: VisualParams::REST,
            target: VisualParams::REST,
            progress: 1.0,
        });
        if track.target == target {
            return false;
        }
        track.start = track.current;
        track.target = target;
        track.progress = 0.0;
        self.active.insert(unit.clone());
        true
    }

    /// Advance every transitioning unit by `dt` seconds and return the new
    /// params of the units that changed
    pub fn tick(&mut self, dt: f32) -> Vec<(UnitId, VisualParams)> {
        if self.active.is_empty() {
            return Vec::new();
        }

        let step = dt.max(0.0) / self.duration;
        let mut updates = Vec::with_capacity(self.active.len());
        let mut finished = Vec::new();

        for unit in &self.active {
            let Some(track) = self.tracks.get_mut(unit) else {
                finished.push(unit.clone());
                continue;
            };
            track.progress = (track.progress + step).min(1.0);
            if track.progress >= 1.0 {
                track.current = track.target;
                finished.push(unit.clone());
            } else {
                let eased = ease_out_cubic(track.progress);
                track.current = VisualParams::lerp(&track.start, &track.target, eased);
            }
            updates.push((unit.clone(), track.current));
        }

        for unit in finished {
            self.active.remove(&unit);
        }
        updates
    }

    pub fn current(&self, unit: &UnitId) -> VisualParams {
        self.tracks
            .get(unit)
            .map(|t| t.current)
            .unwrap_or(VisualParams::REST)
    }

    pub fn is_settled(&self, unit: &UnitId) -> bool {
        !self.active.contains(unit)
    }

    /// Number of units still transitioning
    pub fn active_len(&self) -> usize {
        self.active.len()
    }
}

impl Default for HighlightAnimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> UnitId {
        UnitId::new(raw).unwrap()
    }

    #[test]
    fn test_target_table() {
        assert!(highlight_target(false, false, Availability::Available).is_rest());
        assert!(highlight_target(false, false, Availability::Unknown).is_rest());

        let hover = highlight_target(true, false, Availability::Available);
        assert_eq!((hover.scale, hover.glow), (HOVER_SCALE, HOVER_GLOW));
        assert_eq!(hover.tint, Some(Tint::AVAILABLE));

        let hover_occupied = highlight_target(true, false, Availability::Occupied);
        assert_eq!(hover_occupied.tint, Some(Tint::OCCUPIED));

        let selected = highlight_target(false, true, Availability::Unknown);
        assert_eq!((selected.scale, selected.glow), (SELECTED_SCALE, SELECTED_GLOW));
        assert_eq!(selected.tint, Some(Tint::OCCUPIED));

        assert_eq!(
            highlight_target(true, true, Availability::Available),
            highlight_target(false, true, Availability::Available)
        );
    }

    #[test]
    fn test_surface_patch_is_bounded() {
        let baseline = SurfaceBaseline { metallic: 0.9, roughness: 0.05 };
        assert!(baseline.patch(&VisualParams::REST).is_none());

        let selected = highlight_target(false, true, Availability::Available);
        let patch = baseline.patch(&selected).unwrap();
        assert_eq!(patch.metallic, 1.0);
        assert_eq!(patch.roughness, 0.0);

        let painted = SurfaceBaseline { metallic: 0.1, roughness: 0.7 };
        let patch = painted.patch(&selected).unwrap();
        assert!((patch.metallic - 0.3).abs() < 1e-6);
        assert!((patch.roughness - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_animation_settles_within_duration() {
        let unit = id("a1");
        let mut animator = HighlightAnimator::new(0.75);
        let target = highlight_target(true, false, Availability::Available);
        assert!(animator.retarget(&unit, target));
        assert!(!animator.retarget(&unit, target));

        let mut elapsed = 0.0;
        while animator.active_len() > 0 {
            animator.tick(1.0 / 60.0);
            elapsed += 1.0 / 60.0;
            assert!(elapsed <= 0.75 + 1.0 / 30.0, "did not settle");
        }
        assert_eq!(animator.current(&unit), target);
        assert!(animator.is_settled(&unit));

        // Settled units cost nothing
        assert!(animator.tick(1.0 / 60.0).is_empty());
    }

    #[test]
    fn test_hover_then_unhover_returns_to_rest_exactly() {
        let unit = id("c4");
        let mut animator = HighlightAnimator::default();
        animator.retarget(&unit, highlight_target(true, false, Availability::Occupied));
        animator.tick(0.2);
        // Leave mid-transition
        animator.retarget(&unit, VisualParams::REST);
        let mid = animator.tick(0.1);
        assert_eq!(mid.len(), 1);
        assert!(!mid[0].1.is_rest());

        animator.tick(1.0);
        assert!(animator.current(&unit).is_rest());
        assert_eq!(animator.active_len(), 0);
    }

    #[test]
    fn test_tint_eases_when_availability_flips() {
        let unit = id("a1");
        let mut animator = HighlightAnimator::default();
        animator.retarget(&unit, highlight_target(false, true, Availability::Available));
        animator.tick(1.0);
        assert_eq!(animator.current(&unit).tint, Some(Tint::AVAILABLE));

        animator.retarget(&unit, highlight_target(false, true, Availability::Occupied));
        // A millisecond in, still essentially green
        let early = animator.tick(0.001)[0].1.tint.unwrap();
        assert!(early.r <= Tint::AVAILABLE.r + 2);
        assert!(early.g >= Tint::AVAILABLE.g - 2);

        animator.tick(0.2);
        let mid = animator.current(&unit).tint.unwrap();
        assert_ne!(mid, Tint::AVAILABLE);
        assert_ne!(mid, Tint::OCCUPIED);
        assert!(mid.r > Tint::AVAILABLE.r && mid.r < Tint::OCCUPIED.r);

        animator.tick(1.0);
        assert_eq!(animator.current(&unit).tint, Some(Tint::OCCUPIED));
    }

    #[test]
    fn test_tint_blend_endpoints() {
        assert_eq!(Tint::AVAILABLE.blend(Tint::OCCUPIED, 0.0), Tint::AVAILABLE);
        assert_eq!(Tint::AVAILABLE.blend(Tint::OCCUPIED, 1.0), Tint::OCCUPIED);
    }

    #[test]
    fn test_only_transitioning_units_are_ticked() {
        let mut animator = HighlightAnimator::default();
        animator.retarget(&id("a1"), highlight_target(false, true, Availability::Available));
        animator.tick(1.0);
        animator.retarget(&id("a2"), highlight_target(true, false, Availability::Available));

        let updates = animator.tick(0.1);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, id("a2"));
    }
}
