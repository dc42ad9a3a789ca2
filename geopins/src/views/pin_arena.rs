use std::collections::HashMap;

use super::map_widget::PinHandle;

#[derive(Debug)]
struct Slot {
    marker_id: String,
    pin: PinHandle,
}

/// Pins rendered on the map, one per marker id.
///
/// Slots are reused after removal, the id index points into the slot vector.
#[derive(Debug, Default)]
pub struct PinArena {
    slots: Vec<Option<Slot>>,
    index: HashMap<String, usize>,
    free: Vec<usize>,
}

impl PinArena {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, marker_id: &str) -> bool {
        self.index.contains_key(marker_id)
    }

    pub fn get(&self, marker_id: &str) -> Option<PinHandle> {
        self.index
            .get(marker_id)
            .and_then(|&i| self.slots[i].as_ref())
            .map(|slot| slot.pin)
    }

    pub fn marker_id(&self, pin: PinHandle) -> Option<&str> {
        self.iter().find(|(_, p)| *p == pin).map(|(id, _)| id)
    }

    /// Returns the pin previously stored for `marker_id`, if any.
    pub fn insert(&mut self, marker_id: &str, pin: PinHandle) -> Option<PinHandle> {
        let slot = Slot {
            marker_id: marker_id.to_string(),
            pin,
        };

        if let Some(&i) = self.index.get(marker_id) {
            return self.slots[i].replace(slot).map(|old| old.pin);
        }

        let i = match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(slot);
                i
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.index.insert(marker_id.to_string(), i);
        None
    }

    pub fn remove(&mut self, marker_id: &str) -> Option<PinHandle> {
        let i = self.index.remove(marker_id)?;
        self.free.push(i);
        self.slots[i].take().map(|slot| slot.pin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PinHandle)> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (slot.marker_id.as_str(), slot.pin))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.free.clear();
    }
}

#[test]
fn test_pin_arena() {
    let mut arena = PinArena::default();
    assert!(arena.is_empty());

    assert_eq!(arena.insert("a", PinHandle(1)), None);
    assert_eq!(arena.insert("b", PinHandle(2)), None);
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.get("b"), Some(PinHandle(2)));
    assert_eq!(arena.marker_id(PinHandle(1)), Some("a"));

    assert_eq!(arena.remove("a"), Some(PinHandle(1)));
    assert_eq!(arena.remove("a"), None);
    assert!(!arena.contains("a"));
    assert_eq!(arena.marker_id(PinHandle(1)), None);

    // Freed slot is reused
    assert_eq!(arena.insert("c", PinHandle(3)), None);
    assert_eq!(arena.slots.len(), 2);
    let ids: Vec<&str> = arena.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["c", "b"]);

    assert_eq!(arena.insert("c", PinHandle(4)), Some(PinHandle(3)));
    assert_eq!(arena.get("c"), Some(PinHandle(4)));

    arena.clear();
    assert!(arena.is_empty());
    assert_eq!(arena.get("b"), None);
}
