/// Handle to a slot in a [`MarkerArena`]. Stale handles (whose slot was freed
/// and reused) never resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Index-stable storage with generational handles. Removing an entry never
/// shifts the others; freed slots are recycled by later inserts.
#[derive(Debug, Clone)]
pub struct MarkerArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for MarkerArena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> MarkerArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn insert(&mut self, value: T) -> MarkerId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return MarkerId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        MarkerId {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, id: MarkerId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: MarkerId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn remove(&mut self, id: MarkerId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    MarkerId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MarkerId, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|value| {
                (
                    MarkerId {
                        index: index as u32,
                        generation,
                    },
                    value,
                )
            })
        })
    }

    /// Removes every entry for which `keep` returns false and hands each
    /// removed entry to `removed`.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool, mut removed: impl FnMut(MarkerId, T)) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let drop_it = matches!(&slot.value, Some(value) if !keep(value));
            if !drop_it {
                continue;
            }
            if let Some(value) = slot.value.take() {
                let id = MarkerId {
                    index: index as u32,
                    generation: slot.generation,
                };
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                self.len -= 1;
                removed(id, value);
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_slots_are_recycled_with_new_generation() {
        let mut arena = MarkerArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(arena.remove(a), Some("a"));
        assert!(arena.get(a).is_none());

        let c = arena.insert("c");
        assert_eq!(arena.capacity(), 2);
        assert_eq!(arena.get(c), Some(&"c"));
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn retain_keeps_other_handles_valid() {
        let mut arena = MarkerArena::new();
        let ids: Vec<_> = (0..5).map(|i| arena.insert(i)).collect();

        let mut removed = Vec::new();
        arena.retain(|value| value % 2 == 0, |_, value| removed.push(value));

        assert_eq!(removed, vec![1, 3]);
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.get(ids[4]), Some(&4));
        assert!(arena.get(ids[1]).is_none());
    }

    #[test]
    fn double_remove_is_harmless() {
        let mut arena = MarkerArena::new();
        let id = arena.insert(1);
        assert!(arena.remove(id).is_some());
        assert!(arena.remove(id).is_none());
        assert!(arena.is_empty());
    }
}
