use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryItem {
    pub slot: u16,
    pub name: String,
    pub count: u32,
}

impl InventoryItem {
    pub fn new(slot: u16, name: impl Into<String>, count: u32) -> Self {
        Self {
            slot,
            name: name.into(),
            count,
        }
    }
}

/// An inventory item together with how much faster it harvests the current
/// target than bare hands.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCandidate {
    pub item: InventoryItem,
    pub relative_speed: f64,
}

/// Chooses the item that harvests the target fastest.
///
/// `harvest_time(None)` is the bare-hand baseline and `harvest_time(Some(item))`
/// the time with `item` held. The winner has the strictly highest
/// `baseline / time` ratio above 1; on ties the earlier item wins. Ratios that
/// are not numbers (both times zero or both infinite) never win.
pub fn pick_best_tool<F>(items: &[InventoryItem], mut harvest_time: F) -> Option<ToolCandidate>
where
    F: FnMut(Option<&InventoryItem>) -> f64,
{
    let baseline = harvest_time(None);
    let mut best: Option<ToolCandidate> = None;
    let mut best_speed = 1.0_f64;

    for item in items {
        let relative_speed = baseline / harvest_time(Some(item));
        if relative_speed > best_speed {
            best_speed = relative_speed;
            best = Some(ToolCandidate {
                item: item.clone(),
                relative_speed,
            });
        }
    }

    best
}
