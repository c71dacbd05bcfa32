use std::collections::{BTreeMap, HashSet, VecDeque};

use thiserror::Error;

use crate::{errors::RequireError, stack::Located};

/// Computes the depth of the scope a singleton has to be cached in
///
/// That is the deepest scope defining the singleton itself or anything in its dependency closure.
/// Caching any shallower would let the value outlive a dependency once that scope is popped.
///
/// `locate` finds the defining scope of a name, as seen from the resolving context.
pub(crate) fn attachment_depth(
    singleton: &Located,
    mut locate: impl FnMut(&str) -> Option<Located>,
) -> Result<usize, RequireError> {
    let mut depth = singleton.depth;
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = singleton.entry.dependencies().iter().cloned().collect();

    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }

        let dependency =
            locate(&name).ok_or_else(|| RequireError::InjectionMissing(name.clone()))?;

        depth = depth.max(dependency.depth);
        queue.extend(dependency.entry.dependencies().iter().cloned());
    }

    Ok(depth)
}

/// Graph of every injectable visible to a context
///
/// Used to find missing dependencies up front and to visualize the stack
pub struct DependencyGraph {
    map: BTreeMap<String, DependencyGraphEntry>,
}

struct DependencyGraphEntry {
    scope: String,
    depth: usize,
    dependencies: Vec<String>,
}

impl DependencyGraph {
    pub(crate) fn new(visible: impl IntoIterator<Item = Located>) -> Self {
        let map = visible
            .into_iter()
            .map(|located| {
                let entry = DependencyGraphEntry {
                    scope: located.scope.name().to_string(),
                    depth: located.depth,
                    dependencies: located.entry.dependencies().to_vec(),
                };
                (located.entry.name().to_string(), entry)
            })
            .collect();

        Self { map }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn dependencies(&self, name: &str) -> Option<&[String]> {
        self.map.get(name).map(|entry| entry.dependencies.as_slice())
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let errors: Vec<_> = self
            .map
            .iter()
            .flat_map(|(name, entry)| {
                entry
                    .dependencies
                    .iter()
                    .filter(|dependency| !self.map.contains_key(*dependency))
                    .map(|dependency| DependencyGraphError::MissingDependency {
                        dependency: dependency.clone(),
                        required_by: name.clone(),
                    })
            })
            .collect();

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        Ok(())
    }
}

impl std::fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, entry) in &self.map {
            write!(f, "{name} [{}@{}]", entry.scope, entry.depth)?;
            if !entry.dependencies.is_empty() {
                write!(f, " -> {}", entry.dependencies.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: String,
        required_by: String,
    },
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}
