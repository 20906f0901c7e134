use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::province::Province;

/// Default number of connections kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// The answer to a path query: the provinces to traverse from start to end,
/// both inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// -1 if not connected, 0 if both endpoints are the same province,
    /// otherwise the number of hops.
    pub steps: i32,
    /// Ordered id/province pairs from start to end.
    pub provinces: Vec<(String, Province)>,
}

impl Connection {
    /// Sentinel for "not connected", also returned for queries naming unknown
    /// or untraversable provinces.
    pub fn disconnected() -> Self {
        Self {
            steps: -1,
            provinces: Vec::new(),
        }
    }

    pub(crate) fn single(id: &str, province: &Province) -> Self {
        Self {
            steps: 0,
            provinces: vec![(id.to_string(), province.clone())],
        }
    }

    pub(crate) fn from_path(path: &[String], provinces: &BTreeMap<String, Province>) -> Self {
        let pairs: Vec<(String, Province)> = path
            .iter()
            .filter_map(|id| provinces.get(id).map(|p| (id.clone(), p.clone())))
            .collect();
        Self {
            steps: pairs.len() as i32 - 1,
            provinces: pairs,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.steps >= 0
    }

    /// Ids along the route, in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.provinces.iter().map(|(id, _)| id.as_str())
    }

    pub fn start(&self) -> Option<&str> {
        self.provinces.first().map(|(id, _)| id.as_str())
    }

    pub fn end(&self) -> Option<&str> {
        self.provinces.last().map(|(id, _)| id.as_str())
    }

    /// Total pixel area covered by the route's provinces.
    pub fn length(&self) -> u64 {
        self.provinces.iter().map(|(_, p)| p.area()).sum()
    }

    /// The same route walked the other way.
    pub fn reversed(&self) -> Self {
        let mut reversed = self.clone();
        reversed.provinces.reverse();
        reversed
    }
}

impl PartialEq for Connection {
    /// Two connections are equal when they have the same step count and visit
    /// the same provinces in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
            && self.provinces.len() == other.provinces.len()
            && self.ids().eq(other.ids())
    }
}

/// Most-recently-used cache of prior path answers.
///
/// A cached route answers queries in both directions: the reverse of a stored
/// connection is as valid as the connection itself, so one slot serves both.
#[derive(Debug, Clone)]
pub struct ConnectionCache {
    entries: VecDeque<Connection>,
    capacity: usize,
}

impl Default for ConnectionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ConnectionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look for a cached answer to `start -> end` in either direction.
    pub fn lookup(&mut self, start: &str, end: &str) -> Option<Connection> {
        let mut found = None;
        for (index, conn) in self.entries.iter().enumerate() {
            match (conn.start(), conn.end()) {
                (Some(a), Some(b)) if a == start && b == end => {
                    found = Some((index, false));
                    break;
                }
                (Some(a), Some(b)) if a == end && b == start => {
                    found = Some((index, true));
                    break;
                }
                _ => {}
            }
        }

        let (index, reverse) = found?;
        if reverse {
            // The reversed copy becomes its own entry; the original keeps its
            // place in the order.
            let reversed = self.entries[index].reversed();
            self.insert(reversed.clone());
            Some(reversed)
        } else {
            // Refresh: move the hit to the front.
            let hit = self.entries.remove(index)?;
            self.entries.push_front(hit.clone());
            Some(hit)
        }
    }

    /// Prepend a fresh connection, dropping the oldest entry past capacity.
    pub fn insert(&mut self, connection: Connection) {
        self.entries.push_front(connection);
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }
}
