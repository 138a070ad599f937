use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockres_core::{DomainError, DomainResult, LocationId};

/// A stock location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub parent: Option<LocationId>,
    /// Slash-separated path from the root, e.g. `WH/Stock/Zone1/Bin1`.
    pub complete_name: String,
}

/// Mutable builder; freeze with [`LocationTreeBuilder::build`].
#[derive(Debug, Default)]
pub struct LocationTreeBuilder {
    locations: Vec<Location>,
    index: HashMap<LocationId, usize>,
}

impl LocationTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level location.
    pub fn add_root(&mut self, name: impl Into<String>) -> LocationId {
        let id = LocationId::new();
        let name = name.into();
        self.push(Location {
            id,
            complete_name: name.clone(),
            name,
            parent: None,
        });
        id
    }

    /// Add a location under `parent`. Children keep insertion order.
    pub fn add_child(
        &mut self,
        parent: LocationId,
        name: impl Into<String>,
    ) -> DomainResult<LocationId> {
        let id = LocationId::new();
        self.insert(id, Some(parent), name)?;
        Ok(id)
    }

    /// Add a location with a caller-chosen identifier.
    pub fn insert(
        &mut self,
        id: LocationId,
        parent: Option<LocationId>,
        name: impl Into<String>,
    ) -> DomainResult<()> {
        if self.index.contains_key(&id) {
            return Err(DomainError::validation(format!("location {id} already exists")));
        }
        let name = name.into();
        let complete_name = match parent {
            Some(parent_id) => {
                let idx = *self
                    .index
                    .get(&parent_id)
                    .ok_or_else(|| DomainError::not_found("location", parent_id))?;
                format!("{}/{}", self.locations[idx].complete_name, name)
            }
            None => name.clone(),
        };
        self.push(Location {
            id,
            name,
            parent,
            complete_name,
        });
        Ok(())
    }

    fn push(&mut self, location: Location) {
        self.index.insert(location.id, self.locations.len());
        self.locations.push(location);
    }

    /// Freeze into an immutable tree with precomputed traversal intervals.
    pub fn build(self) -> LocationTree {
        let Self { locations, index } = self;

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); locations.len()];
        let mut roots = Vec::new();
        for (i, location) in locations.iter().enumerate() {
            match location.parent.and_then(|p| index.get(&p)) {
                Some(&parent) => children[parent].push(i),
                None => roots.push(i),
            }
        }

        // Iterative depth-first preorder: roots and children in insertion order.
        let mut order = Vec::with_capacity(locations.len());
        let mut spans = vec![(0usize, 0usize); locations.len()];
        let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&r| (r, false)).collect();
        while let Some((node, visited)) = stack.pop() {
            if visited {
                spans[node].1 = order.len();
                continue;
            }
            spans[node].0 = order.len();
            order.push(locations[node].id);
            stack.push((node, true));
            for &child in children[node].iter().rev() {
                stack.push((child, false));
            }
        }

        LocationTree {
            locations,
            index,
            order,
            spans,
        }
    }
}

/// Immutable location forest.
///
/// Every location carries a `[enter, exit)` interval over the preorder
/// traversal; `a` is inside `b` exactly when `a`'s interval nests in `b`'s.
#[derive(Debug, Clone)]
pub struct LocationTree {
    locations: Vec<Location>,
    index: HashMap<LocationId, usize>,
    order: Vec<LocationId>,
    spans: Vec<(usize, usize)>,
}

impl LocationTree {
    pub fn builder() -> LocationTreeBuilder {
        LocationTreeBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: LocationId) -> DomainResult<&Location> {
        self.index
            .get(&id)
            .map(|&i| &self.locations[i])
            .ok_or_else(|| DomainError::not_found("location", id))
    }

    /// Look up a location by its slash-separated complete name.
    pub fn find(&self, complete_name: &str) -> Option<&Location> {
        self.locations
            .iter()
            .find(|l| l.complete_name == complete_name)
    }

    /// `location` and everything below it, in canonical preorder.
    pub fn expand(&self, location: LocationId) -> DomainResult<&[LocationId]> {
        let (enter, exit) = self.span(location)?;
        Ok(&self.order[enter..exit])
    }

    /// Whether `a` is `b` or lies somewhere below it. Unknown ids are never
    /// descendants of anything.
    pub fn is_descendant_or_self(&self, a: LocationId, b: LocationId) -> bool {
        match (self.span(a), self.span(b)) {
            (Ok((a_enter, a_exit)), Ok((b_enter, b_exit))) => {
                b_enter <= a_enter && a_exit <= b_exit
            }
            _ => false,
        }
    }

    /// Position of `location` in the canonical traversal.
    pub fn rank(&self, location: LocationId) -> DomainResult<usize> {
        self.span(location).map(|(enter, _)| enter)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.order
            .iter()
            .filter_map(|id| self.index.get(id).map(|&i| &self.locations[i]))
    }

    fn span(&self, id: LocationId) -> DomainResult<(usize, usize)> {
        self.index
            .get(&id)
            .map(|&i| self.spans[i])
            .ok_or_else(|| DomainError::not_found("location", id))
    }
}
