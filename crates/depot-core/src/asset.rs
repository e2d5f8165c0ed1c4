//! Scene asset classification and the identity-tagged asset registry
//!
//! Every model file becomes one [`AssetSpec`]. The registry maps asset
//! identities to their spawned root and mesh parts, so a pointer hit on any
//! mesh resolves to its owning asset with a single lookup.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::unit::UnitId;

/// What a model file represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// A rentable unit; interactive
    Unit,
    /// Walkway between unit rows; never interactive
    Bridge,
    /// Anything else (building shell, props)
    Other,
}

/// Classified model file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    /// File name as configured, e.g. `c13.glb`
    pub file: String,
    /// Unit id for units, otherwise the lowercased file stem
    pub identity: String,
    pub kind: AssetKind,
    /// Keep the authored materials instead of the load-time paint
    pub keep_materials: bool,
}

impl AssetSpec {
    /// Unit id, when this asset is a unit
    pub fn unit_id(&self) -> Option<UnitId> {
        match self.kind {
            AssetKind::Unit => UnitId::new(&self.identity),
            AssetKind::Bridge | AssetKind::Other => None,
        }
    }
}

/// Lowercased file name without a trailing `.glb`
fn file_stem(file_name: &str) -> String {
    let lower = file_name.trim().to_lowercase();
    match lower.strip_suffix(".glb") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Matches `^[a-z]\d+$` on an already lowercased stem
fn is_unit_stem(stem: &str) -> bool {
    let mut chars = stem.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    let rest = chars.as_str();
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Classify a model file by name.
///
/// `aliases` maps file names to unit ids and overrides the naming rule.
/// `keep_materials` lists file names whose authored materials are preserved.
pub fn classify(
    file_name: &str,
    aliases: &BTreeMap<String, String>,
    keep_materials: &[String],
) -> AssetSpec {
    let lower = file_name.trim().to_lowercase();
    let keep = keep_materials.iter().any(|k| k.trim().to_lowercase() == lower);

    let alias = aliases
        .iter()
        .find(|(file, _)| file.trim().to_lowercase() == lower)
        .and_then(|(_, unit)| UnitId::new(unit));

    let stem = file_stem(file_name);
    let (identity, kind) = if let Some(unit) = alias {
        (unit.as_str().to_string(), AssetKind::Unit)
    } else if lower.ends_with(".glb") && is_unit_stem(&stem) {
        (stem, AssetKind::Unit)
    } else if lower.contains("bridge") {
        (stem, AssetKind::Bridge)
    } else {
        (stem, AssetKind::Other)
    };

    AssetSpec {
        file: file_name.trim().to_string(),
        identity,
        kind,
        keep_materials: keep,
    }
}

/// One registered asset and the handles of its spawned pieces
#[derive(Debug, Clone)]
pub struct RegisteredAsset<H> {
    pub spec: AssetSpec,
    pub root: H,
    pub parts: Vec<H>,
}

/// Asset identity -> spawned instance, plus the reverse part -> identity tags
///
/// `H` is whatever handle the host engine uses for spawned objects.
#[derive(Debug, Clone)]
pub struct AssetRegistry<H> {
    assets: BTreeMap<String, RegisteredAsset<H>>,
    part_owner: HashMap<H, String>,
}

impl<H> Default for AssetRegistry<H> {
    fn default() -> Self {
        Self {
            assets: BTreeMap::new(),
            part_owner: HashMap::new(),
        }
    }
}

impl<H: Copy + Eq + Hash> AssetRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spawned asset. Returns `false` if the identity is already known.
    pub fn register(&mut self, spec: AssetSpec, root: H) -> bool {
        if self.assets.contains_key(&spec.identity) {
            tracing::debug!("Asset {} already registered", spec.identity);
            return false;
        }
        tracing::info!("Registered {:?} asset {} from {}", spec.kind, spec.identity, spec.file);
        self.assets.insert(
            spec.identity.clone(),
            RegisteredAsset {
                spec,
                root,
                parts: Vec::new(),
            },
        );
        true
    }

    /// Tag a mesh part with its owning asset
    pub fn attach_part(&mut self, identity: &str, part: H) -> bool {
        let Some(asset) = self.assets.get_mut(identity) else {
            return false;
        };
        if self.part_owner.contains_key(&part) {
            return false;
        }
        asset.parts.push(part);
        self.part_owner.insert(part, identity.to_string());
        true
    }

    pub fn get(&self, identity: &str) -> Option<&RegisteredAsset<H>> {
        self.assets.get(identity)
    }

    pub fn kind_of(&self, identity: &str) -> Option<AssetKind> {
        self.assets.get(identity).map(|a| a.spec.kind)
    }

    /// Identity of the asset owning `part`
    pub fn owner_of(&self, part: H) -> Option<&str> {
        self.part_owner.get(&part).map(String::as_str)
    }

    /// Unit id for an interactive asset; `None` for bridges, other assets and
    /// unknown identities
    pub fn interaction_target(&self, identity: &str) -> Option<UnitId> {
        self.assets.get(identity).and_then(|a| a.spec.unit_id())
    }

    /// Registered unit assets, ordered by identity
    pub fn units(&self) -> impl Iterator<Item = (UnitId, &RegisteredAsset<H>)> {
        self.assets
            .values()
            .filter_map(|asset| asset.spec.unit_id().map(|id| (id, asset)))
    }

    /// Mesh parts of the asset for `unit`
    pub fn parts_of(&self, unit: &UnitId) -> &[H] {
        self.assets
            .get(unit.as_str())
            .map(|a| a.parts.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Values captured once per key and never overwritten
#[derive(Debug, Clone)]
pub struct BaselineSet<K, V> {
    values: HashMap<K, V>,
}

impl<K, V> Default for BaselineSet<K, V> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> BaselineSet<K, V> {
    /// Store `make()` under `key` unless a value is already present.
    /// Returns `true` when a new value was captured.
    pub fn capture(&mut self, key: K, make: impl FnOnce() -> V) -> bool {
        if self.values.contains_key(&key) {
            return false;
        }
        self.values.insert(key, make());
        true
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_aliases() -> BTreeMap<String, String> {
        BTreeMap::from([("update 2.glb".to_string(), "b2".to_string())])
    }

    #[test]
    fn test_classify_units() {
        let aliases = BTreeMap::new();
        for (file, id) in [("a1.glb", "a1"), ("C13.GLB", "c13"), ("e3.glb", "e3")] {
            let spec = classify(file, &aliases, &[]);
            assert_eq!(spec.kind, AssetKind::Unit, "{file}");
            assert_eq!(spec.unit_id().unwrap().as_str(), id);
        }
    }

    #[test]
    fn test_classify_bridges_and_others() {
        let aliases = BTreeMap::new();
        for file in ["a bridge.glb", "c bridge 2.glb", "B Bridge.glb"] {
            let spec = classify(file, &aliases, &[]);
            assert_eq!(spec.kind, AssetKind::Bridge, "{file}");
            assert!(spec.unit_id().is_none());
        }
        let shell = classify("warehouse.glb", &aliases, &[]);
        assert_eq!(shell.kind, AssetKind::Other);
        assert_eq!(shell.identity, "warehouse");

        // Not a single letter followed by digits
        assert_eq!(classify("ab1.glb", &aliases, &[]).kind, AssetKind::Other);
        assert_eq!(classify("a.glb", &aliases, &[]).kind, AssetKind::Other);
        assert_eq!(classify("a1.gltf", &aliases, &[]).kind, AssetKind::Other);
    }

    #[test]
    fn test_alias_overrides_naming_rule() {
        let keep = vec!["update 2.glb".to_string()];
        let spec = classify("update 2.glb", &sample_aliases(), &keep);
        assert_eq!(spec.kind, AssetKind::Unit);
        assert_eq!(spec.identity, "b2");
        assert!(spec.keep_materials);
        assert!(!classify("b1.glb", &sample_aliases(), &keep).keep_materials);
    }

    #[test]
    fn test_register_is_idempotent() {
        let aliases = BTreeMap::new();
        let mut registry: AssetRegistry<u32> = AssetRegistry::new();
        assert!(registry.register(classify("a1.glb", &aliases, &[]), 1));
        assert!(!registry.register(classify("A1.glb", &aliases, &[]), 2));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a1").unwrap().root, 1);
    }

    #[test]
    fn test_parts_resolve_to_owner() {
        let aliases = BTreeMap::new();
        let mut registry: AssetRegistry<u32> = AssetRegistry::new();
        registry.register(classify("a1.glb", &aliases, &[]), 1);
        registry.register(classify("a bridge.glb", &aliases, &[]), 2);

        assert!(registry.attach_part("a1", 10));
        assert!(registry.attach_part("a1", 11));
        assert!(registry.attach_part("a bridge", 20));
        assert!(!registry.attach_part("a1", 20));
        assert!(!registry.attach_part("missing", 30));

        assert_eq!(registry.owner_of(11), Some("a1"));
        assert_eq!(registry.owner_of(20), Some("a bridge"));
        assert_eq!(registry.interaction_target("a1").unwrap().as_str(), "a1");
        assert!(registry.interaction_target("a bridge").is_none());
        assert_eq!(registry.kind_of("a bridge"), Some(AssetKind::Bridge));
        assert_eq!(registry.parts_of(&UnitId::new("a1").unwrap()), &[10, 11]);
        assert_eq!(registry.units().count(), 1);
    }

    #[test]
    fn test_baseline_captured_once() {
        let mut baselines: BaselineSet<u32, f32> = BaselineSet::default();
        assert!(baselines.capture(1, || 0.7));
        assert!(!baselines.capture(1, || 0.1));
        assert_eq!(baselines.get(&1), Some(&0.7));
        assert_eq!(baselines.len(), 1);
    }
}
