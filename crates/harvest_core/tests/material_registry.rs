use harvest_core::{MaterialId, MaterialRegistry};
use pretty_assertions::assert_eq;

fn registry() -> MaterialRegistry {
    MaterialRegistry::from_names(["air", "stone", "oak_log", "iron_ore", "deepslate_iron_ore"])
}

#[test]
fn exact_names_resolve_regardless_of_case() {
    let registry = registry();
    assert_eq!(registry.resolve("oak_log"), Some(MaterialId(2)));
    assert_eq!(registry.resolve("  OAK_Log "), Some(MaterialId(2)));
}

#[test]
fn partial_names_fall_back_to_first_containing_entry() {
    let registry = registry();
    assert_eq!(registry.resolve("iron"), Some(MaterialId(3)));
    assert_eq!(registry.resolve("deepslate"), Some(MaterialId(4)));
    assert_eq!(registry.resolve("diamond"), None);
    assert_eq!(registry.resolve("   "), None);
}

#[test]
fn canonical_name_round_trips() {
    let registry = registry();
    for name in registry.names() {
        let id = registry.resolve(name).unwrap();
        assert_eq!(registry.canonical_name(id), Some(name));
    }
    let id = registry.resolve("Iron").unwrap();
    let canonical = registry.canonical_name(id).unwrap();
    assert_eq!(registry.resolve(canonical), Some(id));
}

#[test]
fn registering_twice_keeps_the_id() {
    let mut registry = registry();
    let before = registry.len();
    assert_eq!(registry.register("Stone"), MaterialId(1));
    assert_eq!(registry.len(), before);
    assert_eq!(registry.register("birch_log"), MaterialId(before as u32));
}
