//! Hover and selection state
//!
//! All pointer and panel input funnels through [`InteractionState::apply`];
//! nothing else writes the state.

use std::hash::Hash;

use crate::asset::AssetRegistry;
use crate::unit::UnitId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    HoverEnter(UnitId),
    /// Clears the hover only if this unit is the one hovered
    HoverLeave(UnitId),
    Select(UnitId),
    ClearSelection,
}

/// Current hover and selection; the two are independent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub hovered: Option<UnitId>,
    pub selected: Option<UnitId>,
}

impl InteractionState {
    /// Apply one event. Returns `true` if the state changed.
    pub fn apply(&mut self, event: InteractionEvent) -> bool {
        match event {
            InteractionEvent::HoverEnter(id) => replace(&mut self.hovered, Some(id)),
            InteractionEvent::HoverLeave(id) => {
                if self.hovered.as_ref() == Some(&id) {
                    self.hovered = None;
                    true
                } else {
                    false
                }
            }
            InteractionEvent::Select(id) => {
                let changed = replace(&mut self.selected, Some(id));
                if changed {
                    tracing::info!("Selected unit {:?}", self.selected.as_ref().map(UnitId::as_str));
                }
                changed
            }
            InteractionEvent::ClearSelection => replace(&mut self.selected, None),
        }
    }

    pub fn is_hovered(&self, id: &UnitId) -> bool {
        self.hovered.as_ref() == Some(id)
    }

    pub fn is_selected(&self, id: &UnitId) -> bool {
        self.selected.as_ref() == Some(id)
    }
}

fn replace(slot: &mut Option<UnitId>, value: Option<UnitId>) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Raw pointer input on a mesh part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Over,
    Out,
    Click,
}

/// Translate a pointer action on the asset `identity` into an interaction event.
///
/// Only unit assets are interactive; hits on bridges, other assets or unknown
/// identities produce nothing.
pub fn pointer_event<H: Copy + Eq + Hash>(
    registry: &AssetRegistry<H>,
    identity: &str,
    action: PointerAction,
) -> Option<InteractionEvent> {
    let unit = registry.interaction_target(identity)?;
    Some(match action {
        PointerAction::Over => InteractionEvent::HoverEnter(unit),
        PointerAction::Out => InteractionEvent::HoverLeave(unit),
        PointerAction::Click => InteractionEvent::Select(unit),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::asset::classify;

    fn id(raw: &str) -> UnitId {
        UnitId::new(raw).unwrap()
    }

    #[test]
    fn test_hover_and_select_are_independent() {
        let mut state = InteractionState::default();
        assert!(state.apply(InteractionEvent::Select(id("a1"))));
        assert!(state.apply(InteractionEvent::HoverEnter(id("b1"))));
        assert_eq!(state.selected, Some(id("a1")));
        assert_eq!(state.hovered, Some(id("b1")));

        assert!(state.apply(InteractionEvent::ClearSelection));
        assert_eq!(state.hovered, Some(id("b1")));
        assert!(!state.apply(InteractionEvent::ClearSelection));
    }

    #[test]
    fn test_out_of_order_leave_is_ignored() {
        let mut state = InteractionState::default();
        state.apply(InteractionEvent::HoverEnter(id("a1")));
        state.apply(InteractionEvent::HoverEnter(id("a2")));
        // Leave for a1 arrives after enter on a2
        assert!(!state.apply(InteractionEvent::HoverLeave(id("a1"))));
        assert!(state.is_hovered(&id("a2")));
        assert!(state.apply(InteractionEvent::HoverLeave(id("a2"))));
        assert_eq!(state.hovered, None);
    }

    #[test]
    fn test_reselect_same_unit_is_noop() {
        let mut state = InteractionState::default();
        assert!(state.apply(InteractionEvent::Select(id("c2"))));
        assert!(!state.apply(InteractionEvent::Select(id("c2"))));
        assert!(state.apply(InteractionEvent::Select(id("c3"))));
        assert!(state.is_selected(&id("c3")));
    }

    #[test]
    fn test_bridge_click_changes_nothing() {
        let aliases = BTreeMap::new();
        let mut registry: AssetRegistry<u32> = AssetRegistry::new();
        registry.register(classify("a1.glb", &aliases, &[]), 1);
        registry.register(classify("a bridge.glb", &aliases, &[]), 2);

        let mut state = InteractionState::default();
        state.apply(InteractionEvent::Select(id("a1")));
        let before = state.clone();

        for action in [PointerAction::Over, PointerAction::Click, PointerAction::Out] {
            assert!(pointer_event(&registry, "a bridge", action).is_none());
        }
        assert_eq!(state, before);

        let event = pointer_event(&registry, "a1", PointerAction::Click).unwrap();
        assert_eq!(event, InteractionEvent::Select(id("a1")));
    }
}
