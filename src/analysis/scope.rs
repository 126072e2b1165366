use std::borrow::Borrow;
use std::hash::Hash;

use indexmap::IndexMap;

/// A single frame of a [`ScopeTable`].
pub type Frame<K, V> = IndexMap<K, V>;

/// A stack of name binding frames.
///
/// The base frame is created with the table and is never popped, so `lookup` always has somewhere
/// to end. Bindings are only added to the innermost frame.
#[derive(Debug, Clone)]
pub struct ScopeTable<V, K = String> {
    frames: Vec<Frame<K, V>>,
}

impl<K, V> Default for ScopeTable<V, K> {
    fn default() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }
}

impl<K: Hash + Eq, V> ScopeTable<V, K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pops the innermost frame and returns it.
    ///
    /// Returns `None` without modifying the table if only the base frame remains.
    pub fn exit_scope(&mut self) -> Option<Frame<K, V>> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Runs `f` inside a fresh frame, popping it afterwards.
    pub fn with_scope<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.enter_scope();
        let result = f(self);
        self.exit_scope();

        result
    }

    /// Binds `name` in the innermost frame.
    ///
    /// An existing binding in that frame is never replaced: the rejected value is handed back instead.
    pub fn add(&mut self, name: K, value: V) -> Result<(), V> {
        let frame = self.innermost_mut();

        if frame.contains_key(&name) {
            return Err(value);
        }

        frame.insert(name, value);

        Ok(())
    }

    /// Looks `name` up in the innermost frame only.
    pub fn peek<Q>(&self, name: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.innermost().get(name)
    }

    /// Looks `name` up starting from the innermost frame and moving outwards.
    pub fn lookup<Q>(&self, name: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup_with_level(name).map(|(_, value)| value)
    }

    /// Like `lookup`, also returning the index of the frame the binding was found in.
    pub fn lookup_with_level<Q>(&self, name: &Q) -> Option<(usize, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.frames
            .iter()
            .enumerate()
            .rev()
            .find_map(|(level, frame)| frame.get(name).map(|value| (level, value)))
    }

    /// The index of the innermost frame; 0 is the base frame.
    pub fn current_level(&self) -> usize {
        self.frames.len() - 1
    }

    /// The total number of bindings across all frames.
    pub fn len(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.iter().all(Frame::is_empty)
    }

    pub fn innermost(&self) -> &Frame<K, V> {
        // the base frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    fn innermost_mut(&mut self) -> &mut Frame<K, V> {
        let last = self.frames.len() - 1;

        &mut self.frames[last]
    }

    /// Iterates over every binding, outermost frame first, in insertion order within a frame.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.frames.iter().flat_map(|frame| frame.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_sees_only_the_innermost_frame() {
        let mut table = ScopeTable::<&str>::new();
        table.enter_scope();
        table.add("x".to_owned(), "int").unwrap();
        assert_eq!(table.peek("x"), Some(&"int"));

        table.exit_scope();
        assert_eq!(table.peek("x"), None);
    }

    #[test]
    fn lookup_walks_outwards() {
        let mut table = ScopeTable::<&str>::new();
        table.enter_scope();
        table.add("x".to_owned(), "int").unwrap();

        table.enter_scope();
        assert_eq!(table.peek("x"), None);
        assert_eq!(table.lookup("x"), Some(&"int"));
        assert_eq!(table.lookup_with_level("x"), Some((1, &"int")));
        assert_eq!(table.lookup("y"), None);
    }

    #[test]
    fn inner_bindings_shadow_outer_ones() {
        let mut table = ScopeTable::<u32>::new();
        table.add("x".to_owned(), 1).unwrap();

        table.with_scope(|table| {
            table.add("x".to_owned(), 2).unwrap();
            assert_eq!(table.lookup("x"), Some(&2));
        });

        assert_eq!(table.lookup("x"), Some(&1));
    }

    #[test]
    fn add_rejects_duplicates_in_the_same_frame() {
        let mut table = ScopeTable::<u32>::new();
        table.add("x".to_owned(), 1).unwrap();
        assert_eq!(table.add("x".to_owned(), 2), Err(2));
        assert_eq!(table.lookup("x"), Some(&1));
    }

    #[test]
    fn base_frame_is_never_popped() {
        let mut table = ScopeTable::<u32>::new();
        table.add("x".to_owned(), 1).unwrap();

        assert!(table.exit_scope().is_none());
        assert!(table.exit_scope().is_none());
        assert_eq!(table.current_level(), 0);
        assert_eq!(table.peek("x"), Some(&1));

        table.enter_scope();
        assert_eq!(table.current_level(), 1);
        assert!(table.exit_scope().is_some());
        assert_eq!(table.current_level(), 0);
    }

    #[test]
    fn len_counts_all_frames() {
        let mut table = ScopeTable::<u32>::new();
        assert!(table.is_empty());

        table.add("a".to_owned(), 1).unwrap();
        table.enter_scope();
        table.add("b".to_owned(), 2).unwrap();
        table.add("c".to_owned(), 3).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            ["a", "b", "c"]
        );
    }
}
