use crate::objects::Drawable;

/// Stable reference to a drawable stored in a [`Scene`].
///
/// Stays valid after the drawable is removed from the entry list, until the
/// next [`Scene::compact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntry {
    pub name: String,
    pub handle: DrawableHandle,
    pub selected: bool,
}

enum Slot {
    Live { generation: u32, drawable: Drawable },
    Retired { generation: u32, drawable: Drawable },
    Free { generation: u32 },
}

impl Slot {
    fn generation(&self) -> u32 {
        match self {
            Slot::Live { generation, .. }
            | Slot::Retired { generation, .. }
            | Slot::Free { generation } => *generation,
        }
    }
}

/// Named, ordered drawable list backed by an arena.
#[derive(Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    entries: Vec<SceneEntry>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name`, or `name` with the first free numeric suffix (" 1", " 2", ...).
    pub fn unique_name(&self, name: &str) -> String {
        let mut unique = name.to_string();
        let mut suffix = 1;
        while self.entries.iter().any(|entry| entry.name == unique) {
            unique = format!("{name} {suffix}");
            suffix += 1;
        }
        unique
    }

    pub fn add(&mut self, name: &str, drawable: Drawable) -> DrawableHandle {
        let name = self.unique_name(name);
        let handle = self.insert_slot(drawable);

        log::debug!("Scene: added {name:?}");
        self.entries.push(SceneEntry {
            name,
            handle,
            selected: false,
        });
        handle
    }

    fn insert_slot(&mut self, drawable: Drawable) -> DrawableHandle {
        if let Some(index) = self.free.pop() {
            let generation = self.slots[index as usize].generation() + 1;
            self.slots[index as usize] = Slot::Live {
                generation,
                drawable,
            };
            return DrawableHandle { index, generation };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot::Live {
            generation: 0,
            drawable,
        });
        DrawableHandle {
            index,
            generation: 0,
        }
    }

    fn retire(&mut self, handle: DrawableHandle) {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return;
        };
        if slot.generation() != handle.generation {
            return;
        }

        let taken = std::mem::replace(
            slot,
            Slot::Free {
                generation: handle.generation,
            },
        );
        *slot = match taken {
            Slot::Live {
                generation,
                drawable,
            } => Slot::Retired {
                generation,
                drawable,
            },
            other => other,
        };
    }

    pub fn remove_at(&mut self, index: usize) -> Option<SceneEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        self.retire(entry.handle);
        Some(entry)
    }

    /// Removes every entry called `name`, returning how many went.
    pub fn remove_named(&mut self, name: &str) -> usize {
        let mut removed = Vec::new();
        self.entries.retain(|entry| {
            let keep = entry.name != name;
            if !keep {
                removed.push(entry.handle);
            }
            keep
        });

        for handle in &removed {
            self.retire(*handle);
        }
        removed.len()
    }

    /// Drops drawables removed since the last compaction, releasing their
    /// GPU buffers. Their handles stop resolving afterwards.
    pub fn compact(&mut self) -> usize {
        let mut dropped = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Slot::Retired { generation, .. } = *slot {
                *slot = Slot::Free { generation };
                self.free.push(index as u32);
                dropped += 1;
            }
        }

        if dropped > 0 {
            log::debug!("Scene: released {dropped} drawable(s)");
        }
        dropped
    }

    pub fn get(&self, handle: DrawableHandle) -> Option<&Drawable> {
        match self.slots.get(handle.index as usize)? {
            Slot::Live {
                generation,
                drawable,
            }
            | Slot::Retired {
                generation,
                drawable,
            } if *generation == handle.generation => Some(drawable),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: DrawableHandle) -> Option<&mut Drawable> {
        match self.slots.get_mut(handle.index as usize)? {
            Slot::Live {
                generation,
                drawable,
            }
            | Slot::Retired {
                generation,
                drawable,
            } if *generation == handle.generation => Some(drawable),
            _ => None,
        }
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&SceneEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selects exactly one entry.
    pub fn select(&mut self, index: usize) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.selected = i == index;
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.entries.iter().position(|entry| entry.selected)
    }

    /// Drawables in entry order, skipping handles that no longer resolve.
    pub fn drawables(&self) -> impl Iterator<Item = &Drawable> + '_ {
        self.entries
            .iter()
            .filter_map(move |entry| self.get(entry.handle))
    }

    /// Every drawable still owned by the arena, listed or not.
    pub fn drawables_mut(&mut self) -> impl Iterator<Item = &mut Drawable> + '_ {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Live { drawable, .. } | Slot::Retired { drawable, .. } => Some(drawable),
            Slot::Free { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere() -> Drawable {
        Drawable::sphere(1.0, 4, 2).unwrap()
    }

    #[test]
    fn removed_handle_resolves_until_compaction() {
        let mut scene = Scene::new();
        let handle = scene.add("Sphere", sphere());

        assert!(scene.remove_at(0).is_some());
        assert!(scene.is_empty());
        assert!(scene.get(handle).is_some());
        assert_eq!(scene.drawables().count(), 0);

        assert_eq!(scene.compact(), 1);
        assert!(scene.get(handle).is_none());
    }

    #[test]
    fn freed_slot_is_reused_with_new_generation() {
        let mut scene = Scene::new();
        let old = scene.add("A", sphere());
        scene.remove_named("A");
        scene.compact();

        let new = scene.add("B", sphere());
        assert_ne!(old, new);
        assert!(scene.get(old).is_none());
        assert!(scene.get(new).is_some());
    }

    #[test]
    fn select_is_exclusive() {
        let mut scene = Scene::new();
        scene.add("A", sphere());
        scene.add("B", sphere());

        scene.select(0);
        scene.select(1);
        assert_eq!(scene.selected(), Some(1));
        assert!(!scene.entries()[0].selected);
    }
}
