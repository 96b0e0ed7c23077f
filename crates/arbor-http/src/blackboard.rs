//! Blackboard — a data store whose value updates are reversible.
//!
//! Controllers thread per-subtree configuration down the dispatch tree by
//! setting values on the request's blackboard for the duration of one scope.
//! Keys are dotted paths: `"services.templates"` addresses the `templates`
//! slot inside the `services` namespace, creating intermediate namespaces
//! lazily when they do not exist. Every change made through a scope is
//! recorded in an undo log and reversed when the scope is released, on every
//! exit path.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Separator between segments of a dotted attribute path.
pub const PATH_SEPARATOR: char = '.';

/// A value stored on the blackboard. Values are reference-counted so scoped
/// overwrites and restores never copy the underlying data.
pub type AttrValue = Arc<dyn Any + Send + Sync>;

/// A hierarchical key/value store with reversible updates.
#[derive(Default)]
pub struct Blackboard {
    slots: HashMap<String, Slot>,
}

enum Slot {
    /// A nested namespace, created lazily for intermediate path segments.
    Namespace(Blackboard),
    /// A terminal value.
    Value(AttrValue),
}

/// One reversal operation, replayed when a scope is released.
enum Undo {
    /// The slot existed before the scope; put its old content back.
    Restore { path: Vec<String>, slot: Slot },
    /// The slot was created by the scope; delete it.
    Remove { path: Vec<String> },
}

/// The undo log produced by applying a [`ParamSet`].
///
/// Operations are replayed in reverse creation order, so namespaces created
/// inside other newly-created namespaces are removed first.
#[derive(Default)]
pub struct UndoLog {
    ops: Vec<Undo>,
}

impl UndoLog {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// An ordered set of dotted-path updates, applied together as one scope.
///
/// Order matters: entries are applied in the order they were added, and the
/// resulting undo log reverses them back-to-front.
#[derive(Clone, Default)]
pub struct ParamSet {
    entries: Vec<(String, AttrValue)>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an update, wrapping the value for storage.
    pub fn set<T: Any + Send + Sync>(mut self, path: impl Into<String>, value: T) -> Self {
        self.entries.push((path.into(), Arc::new(value)));
        self
    }

    /// Add an update from an already-shared value.
    pub fn set_arc(mut self, path: impl Into<String>, value: AttrValue) -> Self {
        self.entries.push((path.into(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The dotted paths this set touches, in application order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(path, value)| (path.as_str(), value))
    }
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by dotted path, downcast to its concrete type.
    ///
    /// Returns `None` when the path is absent, addresses a namespace, or the
    /// stored value has a different type.
    pub fn get<T: Any + Send + Sync>(&self, path: &str) -> Option<&T> {
        match self.slot(path)? {
            Slot::Value(value) => value.downcast_ref::<T>(),
            Slot::Namespace(_) => None,
        }
    }

    /// Like [`get`](Self::get), but returns a shared handle to the value.
    pub fn get_arc<T: Any + Send + Sync>(&self, path: &str) -> Option<Arc<T>> {
        match self.slot(path)? {
            Slot::Value(value) => Arc::downcast(Arc::clone(value)).ok(),
            Slot::Namespace(_) => None,
        }
    }

    /// Whether a dotted path currently holds a value or namespace.
    pub fn contains(&self, path: &str) -> bool {
        self.slot(path).is_some()
    }

    fn slot(&self, path: &str) -> Option<&Slot> {
        let mut segments = path.split(PATH_SEPARATOR);
        let mut current = self.slots.get(segments.next()?)?;
        for segment in segments {
            match current {
                Slot::Namespace(board) => current = board.slots.get(segment)?,
                Slot::Value(_) => return None,
            }
        }
        Some(current)
    }

    /// Apply every entry of a [`ParamSet`], recording how to reverse it.
    ///
    /// Intermediate segments that are absent become fresh namespaces
    /// (recorded as creations). An intermediate segment holding a terminal
    /// value is replaced by a fresh namespace for the scope's duration and
    /// restored wholesale on release. The caller must hand the returned log
    /// back to [`unwind`](Self::unwind) exactly once.
    pub fn apply(&mut self, params: &ParamSet) -> UndoLog {
        let mut log = UndoLog::default();
        for (path, value) in params.iter() {
            self.apply_one(path, value, &mut log);
        }
        log
    }

    fn apply_one(&mut self, path: &str, value: &AttrValue, log: &mut UndoLog) {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let mut walked: Vec<String> = Vec::with_capacity(segments.len());
        let mut current = &mut self.slots;

        // Descend through the intermediate segments, creating namespaces.
        for segment in &segments[..segments.len() - 1] {
            walked.push((*segment).to_string());
            let slot = match current.entry((*segment).to_string()) {
                Entry::Occupied(entry) => {
                    let slot = entry.into_mut();
                    if matches!(slot, Slot::Value(_)) {
                        let old = std::mem::replace(slot, Slot::Namespace(Blackboard::new()));
                        log.ops.push(Undo::Restore { path: walked.clone(), slot: old });
                    }
                    slot
                }
                Entry::Vacant(entry) => {
                    log.ops.push(Undo::Remove { path: walked.clone() });
                    entry.insert(Slot::Namespace(Blackboard::new()))
                }
            };
            let Slot::Namespace(board) = slot else {
                unreachable!("intermediate slot was just made a namespace")
            };
            current = &mut board.slots;
        }

        // The final segment holds the value itself.
        let last = segments[segments.len() - 1];
        walked.push(last.to_string());
        match current.entry(last.to_string()) {
            Entry::Occupied(mut entry) => {
                let old = entry.insert(Slot::Value(Arc::clone(value)));
                log.ops.push(Undo::Restore { path: walked, slot: old });
            }
            Entry::Vacant(entry) => {
                log.ops.push(Undo::Remove { path: walked });
                entry.insert(Slot::Value(Arc::clone(value)));
            }
        }
    }

    /// Replay an undo log, restoring the blackboard to its state before the
    /// corresponding [`apply`](Self::apply).
    ///
    /// Operations run in reverse order and never fail: a path whose parent
    /// has already been removed is simply skipped, which cannot happen for
    /// logs released in LIFO order.
    pub fn unwind(&mut self, log: UndoLog) {
        for op in log.ops.into_iter().rev() {
            match op {
                Undo::Restore { path, slot } => {
                    if let Some((last, prefix)) = path.split_last() {
                        if let Some(slots) = self.slots_at(prefix) {
                            slots.insert(last.clone(), slot);
                        }
                    }
                }
                Undo::Remove { path } => {
                    if let Some((last, prefix)) = path.split_last() {
                        if let Some(slots) = self.slots_at(prefix) {
                            slots.remove(last);
                        }
                    }
                }
            }
        }
    }

    fn slots_at(&mut self, segments: &[String]) -> Option<&mut HashMap<String, Slot>> {
        let mut current = &mut self.slots;
        for segment in segments {
            match current.get_mut(segment) {
                Some(Slot::Namespace(board)) => current = &mut board.slots,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl std::fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, slot) in &self.slots {
            match slot {
                Slot::Namespace(board) => map.entry(key, board),
                Slot::Value(_) => map.entry(key, &"<value>"),
            };
        }
        map.finish()
    }
}
