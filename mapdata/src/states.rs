use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ProvinceCatalog;
use crate::color::Color;
use crate::defs::StateDecl;
use crate::province::Vec2;

/// A named group of provinces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    pub color: Option<Color>,
    provinces: Vec<String>,
    center_sum: Vec2,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            provinces: Vec::new(),
            center_sum: Vec2::default(),
        }
    }

    /// Add a member province, folding its center into the state's.
    pub fn add_province(&mut self, id: &str, center: Vec2) {
        self.provinces.push(id.to_string());
        self.center_sum.x += center.x;
        self.center_sum.y += center.y;
    }

    pub fn has_province(&self, id: &str) -> bool {
        self.provinces.iter().any(|p| p == id)
    }

    pub fn provinces(&self) -> &[String] {
        &self.provinces
    }

    /// Average of the member provinces' centers.
    pub fn center(&self) -> Vec2 {
        if self.provinces.is_empty() {
            return Vec2::default();
        }
        let count = self.provinces.len() as f32;
        Vec2::new(self.center_sum.x / count, self.center_sum.y / count)
    }
}

/// Higher-level grouping of provinces into states.
#[derive(Debug, Clone, Default)]
pub struct StateCatalog {
    states: BTreeMap<String, State>,
}

impl StateCatalog {
    /// Resolve state declarations against an already-built province catalog.
    ///
    /// Unknown province ids are skipped with a warning; a state whose members
    /// all fail to resolve is dropped.
    pub fn build(decls: &[StateDecl], catalog: &ProvinceCatalog) -> Self {
        let mut states = BTreeMap::new();
        for decl in decls {
            if states.contains_key(&decl.id) {
                log::warn!(
                    "Duplicate state id {:?}, keeping the first declaration",
                    decl.id
                );
                continue;
            }

            let mut state = State::new(&decl.name);
            for province_id in &decl.provinces {
                match catalog.center(province_id) {
                    Some(center) => state.add_province(province_id, center),
                    None => log::warn!(
                        "State {:?} lists unknown province {:?}",
                        decl.id,
                        province_id
                    ),
                }
            }

            if state.provinces.is_empty() {
                log::warn!("State {:?} has no resolvable provinces, dropping it", decl.id);
                continue;
            }
            states.insert(decl.id.clone(), state);
        }

        log::info!("Built {} states", states.len());
        Self { states }
    }

    pub fn get(&self, id: &str) -> Option<&State> {
        self.states.get(id)
    }

    pub fn states(&self) -> &BTreeMap<String, State> {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The state a province belongs to.
    pub fn state_of(&self, province_id: &str) -> Option<&str> {
        self.states
            .iter()
            .find(|(_, state)| state.has_province(province_id))
            .map(|(id, _)| id.as_str())
    }

    /// The state owning the province under a point, if any.
    pub fn state_at(&self, catalog: &ProvinceCatalog, x: f32, y: f32) -> Option<&str> {
        let province = catalog.province_at(x, y)?;
        self.state_of(province)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{CityCategory, ProvinceDecl};
    use crate::raster::MapRaster;

    fn catalog() -> ProvinceCatalog {
        let data: Vec<u8> = [1u8, 2, 3, 4]
            .iter()
            .flat_map(|&v| [v, v, v])
            .collect();
        let raster = MapRaster::from_raw(4, 1, 3, data).unwrap();
        let decls: Vec<ProvinceDecl> = (1..=4)
            .map(|v| ProvinceDecl {
                id: format!("PR{v}"),
                color: Color::new(v, v, v),
                name: format!("PR{v}"),
                category: CityCategory::City,
                population: 0,
                wealth: 0,
                food: 0,
                production: 0,
                strength: 0,
            })
            .collect();
        ProvinceCatalog::build(&raster, &decls)
    }

    fn state_decl(id: &str, name: &str, provinces: &[&str]) -> StateDecl {
        StateDecl {
            id: id.to_string(),
            name: name.to_string(),
            provinces: provinces.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_build_and_membership() {
        let catalog = catalog();
        let decls = vec![
            state_decl("ST1", "West", &["PR1", "PR2"]),
            state_decl("ST2", "East", &["PR3", "PR4"]),
        ];
        let states = StateCatalog::build(&decls, &catalog);

        assert_eq!(states.len(), 2);
        assert!(states.get("ST1").unwrap().has_province("PR1"));
        assert_eq!(states.state_of("PR3"), Some("ST2"));
        assert_eq!(states.state_of("PR9"), None);
    }

    #[test]
    fn test_unknown_members_are_dropped() {
        let catalog = catalog();
        let decls = vec![
            state_decl("ST1", "Partial", &["PR1", "GHOST"]),
            state_decl("ST2", "Hollow", &["GHOST"]),
        ];
        let states = StateCatalog::build(&decls, &catalog);

        assert_eq!(states.len(), 1);
        assert_eq!(states.get("ST1").unwrap().provinces(), ["PR1"]);
    }

    #[test]
    fn test_center_is_average_of_member_centers() {
        let catalog = catalog();
        let decls = vec![state_decl("ST1", "Pair", &["PR1", "PR2"])];
        let states = StateCatalog::build(&decls, &catalog);

        let c1 = catalog.center("PR1").unwrap();
        let c2 = catalog.center("PR2").unwrap();
        let center = states.get("ST1").unwrap().center();

        assert!((center.x - (c1.x + c2.x) / 2.0).abs() < 1e-6);
        assert!((center.y - (c1.y + c2.y) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_state_at() {
        let catalog = catalog();
        let decls = vec![state_decl("ST1", "West", &["PR1", "PR2"])];
        let states = StateCatalog::build(&decls, &catalog);

        // PR1 covers x in [-1, -0.5]
        assert_eq!(states.state_at(&catalog, -0.75, 0.0), Some("ST1"));
        // PR3 exists but belongs to no state
        assert_eq!(states.state_at(&catalog, 0.25, 0.0), None);
    }
}
