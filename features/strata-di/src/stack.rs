use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{entry::ProducerEntry, scope::Scope};

/// Scopes visible to one execution context, root first
#[derive(Clone)]
pub struct ScopeStack {
    scopes: Vec<Arc<Scope>>,
}

impl ScopeStack {
    pub(crate) fn new(root: Arc<Scope>) -> Self {
        Self { scopes: vec![root] }
    }

    pub(crate) fn push(&mut self, scope: Arc<Scope>) {
        self.scopes.push(scope);
    }

    /// Drops every scope at or above `depth` - the root is never dropped
    pub(crate) fn truncate(&mut self, depth: usize) {
        self.scopes.truncate(depth.max(1));
    }

    pub fn root(&self) -> &Arc<Scope> {
        &self.scopes[0]
    }

    /// The innermost scope
    pub fn current(&self) -> &Arc<Scope> {
        &self.scopes[self.scopes.len() - 1]
    }

    /// Number of scopes, including the root
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Always false, the root is never removed
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, depth: usize) -> Option<&Arc<Scope>> {
        self.scopes.get(depth)
    }

    /// Root first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Arc<Scope>> {
        self.scopes.iter()
    }

    /// Depth of `scope` on this stack, 0 being the root
    pub fn depth_of(&self, scope: &Scope) -> Option<usize> {
        self.scopes
            .iter()
            .position(|candidate| std::ptr::eq(Arc::as_ptr(candidate), scope))
    }

    /// Searches innermost first - the first scope defining `name` wins
    pub fn find(&self, name: &str) -> Option<Located> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| {
                scope.lookup(name).map(|entry| Located {
                    depth,
                    scope: scope.clone(),
                    entry,
                })
            })
    }

    /// Every visible entry, innermost first - shadowed entries are left out
    pub fn visible(&self) -> Vec<Located> {
        let mut seen = HashSet::new();
        let mut visible = Vec::new();
        for (depth, scope) in self.scopes.iter().enumerate().rev() {
            for entry in scope.entries() {
                if seen.insert(entry.name().to_string()) {
                    visible.push(Located {
                        depth,
                        scope: scope.clone(),
                        entry,
                    });
                }
            }
        }
        visible
    }
}

/// Where a name was found on a stack
#[derive(Clone, Debug)]
pub struct Located {
    /// 0 = root
    pub depth: usize,
    pub scope: Arc<Scope>,
    pub entry: Arc<ProducerEntry>,
}

/// Memo of [ScopeStack::find] for every visible name
///
/// Only ever rebuilt as a whole, never patched.
#[derive(Default)]
pub(crate) struct ResolutionCache {
    map: Option<HashMap<String, Located>>,
}

impl ResolutionCache {
    pub(crate) fn invalidate(&mut self) {
        self.map = None;
    }

    /// Looks up `name`, rebuilding once on a miss
    ///
    /// Shared scopes can gain names through other contexts, which never invalidate this cache.
    pub(crate) fn lookup(&mut self, stack: &ScopeStack, name: &str) -> Option<Located> {
        if let Some(located) = self.map.as_ref().and_then(|map| map.get(name)) {
            return Some(located.clone());
        }

        self.rebuild(stack).get(name).cloned()
    }

    fn rebuild(&mut self, stack: &ScopeStack) -> &HashMap<String, Located> {
        let map: HashMap<String, Located> = stack
            .visible()
            .into_iter()
            .map(|located| (located.entry.name().to_string(), located))
            .collect();
        tracing::trace!("Rebuilt resolution cache with {} names", map.len());
        self.map.insert(map)
    }
}
