use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use map_pathfinding::{Bfs, Graph};

use crate::adjacency::AdjacencyGraph;
use crate::color::Color;
use crate::defs::{self, ProvinceDecl};
use crate::error::MapError;
use crate::province::{Province, Vec2};
use crate::raster::MapRaster;
use crate::route::{Connection, ConnectionCache};

/// Owns every extracted province, the adjacency graph built from them, and
/// the cache of answered path queries.
#[derive(Debug, Clone)]
pub struct ProvinceCatalog {
    provinces: BTreeMap<String, Province>,
    graph: AdjacencyGraph,
    cache: ConnectionCache,
}

impl ProvinceCatalog {
    /// Load the map raster and the declaration file from disk and build the
    /// catalog. A raster that fails to decode is fatal; malformed declaration
    /// records are logged and skipped.
    pub fn load(
        map_path: impl AsRef<Path>,
        decls_path: impl AsRef<Path>,
    ) -> Result<Self, MapError> {
        let raster = MapRaster::open(map_path)?;
        let decls = defs::load_province_decls_path(decls_path)?;
        Ok(Self::build(&raster, &decls))
    }

    /// Extract every declared province from the raster and build the
    /// adjacency graph.
    pub fn build(raster: &MapRaster, decls: &[ProvinceDecl]) -> Self {
        // Every declared color is registered up front, so boundary scanning
        // can tell real neighbors from background colors.
        let used_colors: HashSet<Color> = decls.iter().map(|d| d.color).collect();

        let mut provinces = BTreeMap::new();
        let mut color_to_id: HashMap<Color, String> = HashMap::new();
        for decl in decls {
            if provinces.contains_key(&decl.id) {
                log::warn!(
                    "Duplicate province id {:?}, keeping the first declaration",
                    decl.id
                );
                continue;
            }
            if let Some(owner) = color_to_id.get(&decl.color) {
                log::warn!(
                    "Province {:?} reuses color {} already owned by {:?}",
                    decl.id,
                    decl.color,
                    owner
                );
            } else {
                color_to_id.insert(decl.color, decl.id.clone());
            }

            let province = Province::extract(raster, decl, &used_colors);
            log::debug!(
                "Extracted {:?}: {} rects, area {}",
                decl.id,
                province.rects().len(),
                province.area()
            );
            provinces.insert(decl.id.clone(), province);
        }

        // Resolve touching colors into ids. Untraversable provinces stay out
        // of the graph on both sides.
        let mut graph = AdjacencyGraph::new();
        for (id, province) in &provinces {
            if !province.is_traversable() {
                continue;
            }
            let mut neighbors = BTreeSet::new();
            for color in province.adjacent_colors() {
                let Some(other_id) = color_to_id.get(color) else {
                    continue;
                };
                if other_id == id {
                    continue;
                }
                if provinces.get(other_id).is_some_and(Province::is_traversable) {
                    neighbors.insert(other_id.clone());
                }
            }
            graph.insert_neighbors(id, neighbors);
        }

        log::info!(
            "Built catalog with {} provinces, {} in the adjacency graph",
            provinces.len(),
            graph.province_count()
        );

        Self {
            provinces,
            graph,
            cache: ConnectionCache::default(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Province> {
        self.provinces.get(id)
    }

    pub fn provinces(&self) -> &BTreeMap<String, Province> {
        &self.provinces
    }

    pub fn graph(&self) -> &AdjacencyGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }

    /// Neighbors of a province; empty for unknown or untraversable ids.
    pub fn neighbors_of(&self, id: &str) -> BTreeSet<String> {
        self.graph.neighbors(id)
    }

    /// Pixel area of a province.
    pub fn area(&self, id: &str) -> Option<u64> {
        self.provinces.get(id).map(Province::area)
    }

    /// Accumulated centroid of a province.
    pub fn center(&self, id: &str) -> Option<Vec2> {
        self.provinces.get(id).map(Province::center)
    }

    /// The province under a point in normalized device coordinates.
    pub fn province_at(&self, x: f32, y: f32) -> Option<&str> {
        self.provinces
            .iter()
            .find(|(_, province)| province.contains(x, y))
            .map(|(id, _)| id.as_str())
    }

    /// Route between two provinces, breadth-first over the adjacency graph.
    ///
    /// Answers are cached and reused in both directions. Neighbor expansion
    /// is ordered by ascending province area, which keeps searches
    /// reproducible but can occasionally settle on a longer route than a
    /// plain hop-count optimum between certain pairs.
    pub fn find_path(&mut self, start: &str, end: &str) -> Connection {
        let traversable =
            |id: &str| self.provinces.get(id).is_some_and(Province::is_traversable);
        if !traversable(start) || !traversable(end) {
            return Connection::disconnected();
        }
        if start == end {
            return match self.provinces.get(start) {
                Some(province) => Connection::single(start, province),
                None => Connection::disconnected(),
            };
        }

        if let Some(hit) = self.cache.lookup(start, end) {
            return hit;
        }

        let graph = CatalogGraph { catalog: self };
        let Some(path) = Bfs::find_path(&graph, start.to_string(), end.to_string()) else {
            return Connection::disconnected();
        };

        let connection = Connection::from_path(&path, &self.provinces);
        self.cache.insert(connection.clone());
        connection
    }
}

/// Adapter exposing the catalog's adjacency graph to the pathfinder with the
/// area-ascending expansion order.
struct CatalogGraph<'a> {
    catalog: &'a ProvinceCatalog,
}

impl Graph<String> for CatalogGraph<'_> {
    fn neighbors(&self, node: &String) -> Vec<String> {
        let mut neighbors: Vec<String> = self.catalog.graph.neighbors(node).into_iter().collect();
        // Smallest provinces first; the id is the final tie-break so the
        // order is total.
        neighbors.sort_by(|a, b| {
            let area_a = self.catalog.area(a).unwrap_or(0);
            let area_b = self.catalog.area(b).unwrap_or(0);
            area_a.cmp(&area_b).then_with(|| a.cmp(b))
        });
        neighbors
    }
}
