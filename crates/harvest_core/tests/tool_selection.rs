use harvest_core::{pick_best_tool, InventoryItem};
use pretty_assertions::assert_eq;

fn timed(table: &'static [(&'static str, f64)]) -> impl FnMut(Option<&InventoryItem>) -> f64 {
    move |item| match item {
        None => 3.0,
        Some(item) => table
            .iter()
            .find(|(name, _)| *name == item.name)
            .map(|(_, time)| *time)
            .unwrap_or(3.0),
    }
}

#[test]
fn picks_the_fastest_improving_item() {
    let items = vec![
        InventoryItem::new(0, "dirt", 12),
        InventoryItem::new(1, "wooden_pickaxe", 1),
        InventoryItem::new(2, "iron_pickaxe", 1),
    ];
    let best = pick_best_tool(
        &items,
        timed(&[("wooden_pickaxe", 1.5), ("iron_pickaxe", 0.5)]),
    )
    .expect("a tool improves on bare hands");

    assert_eq!(best.item.name, "iron_pickaxe");
    assert!((best.relative_speed - 6.0).abs() < 1e-9);
}

#[test]
fn ties_keep_the_first_item() {
    let items = vec![
        InventoryItem::new(4, "stone_axe", 1),
        InventoryItem::new(7, "golden_axe", 1),
    ];
    let best = pick_best_tool(&items, timed(&[("stone_axe", 1.0), ("golden_axe", 1.0)])).unwrap();
    assert_eq!(best.item.slot, 4);
}

#[test]
fn returns_none_when_nothing_beats_bare_hands() {
    let items = vec![
        InventoryItem::new(0, "stick", 3),
        InventoryItem::new(1, "feather", 2),
    ];
    assert_eq!(pick_best_tool(&items, timed(&[("stick", 3.0)])), None);
    assert_eq!(pick_best_tool(&[], timed(&[])), None);
}

#[test]
fn instant_tools_win_and_undefined_ratios_are_ignored() {
    let items = vec![
        InventoryItem::new(0, "broken", 1),
        InventoryItem::new(1, "shears", 1),
    ];
    let best = pick_best_tool(&items, |item| match item.map(|i| i.name.as_str()) {
        None => 0.2,
        Some("broken") => f64::NAN,
        Some(_) => 0.0,
    })
    .unwrap();
    assert_eq!(best.item.name, "shears");
    assert!(best.relative_speed.is_infinite());
}
