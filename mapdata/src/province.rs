use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::defs::{CityCategory, ProvinceDecl};
use crate::raster::MapRaster;

/// A 2-D point in the map's normalized coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in normalized device coordinates.
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right one;
/// x runs from -1 at the left edge of the map to +1 at the right, y from +1
/// at the top to -1 at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y1 && y <= self.y0
    }
}

/// A single territorial unit recovered from the map bitmap.
///
/// Every pixel of the province's color belongs to it, contiguous or not;
/// area and adjacency accumulate across all occurrences of the color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Province {
    pub name: String,
    pub color: Color,
    pub category: CityCategory,

    // City data, seeded from the declaration record
    pub population: i32,
    pub wealth: i32,
    pub food: i32,
    pub production: i32,
    pub strength: i32,

    rects: Vec<Rect>,
    center: Vec2,
    area: u64,
    adjacent_colors: HashSet<Color>,
}

impl Province {
    /// Scan the raster for every pixel matching the declaration's color and
    /// build the province's rectangle runs, area, centroid and touching-color
    /// set.
    ///
    /// Only colors present in `used_colors` are ever recorded as adjacent, so
    /// unregistered background colors never show up as neighbors.
    pub fn extract(raster: &MapRaster, decl: &ProvinceDecl, used_colors: &HashSet<Color>) -> Self {
        let mut province = Self::from_decl(decl);
        let target = decl.color;

        let width = raster.width() as usize;
        let height = raster.height() as usize;
        let dx = 2.0 / width as f32;
        let dy = -2.0 / height as f32;

        let mut center_sum = Vec2::default();

        let mut i = 0;
        while i < raster.len() {
            if raster.color_at(i) != target {
                i += 1;
                continue;
            }

            let row = i / width;
            let col = i % width;
            let p = col as f32 * dx - 1.0;
            let q = row as f32 * dy + 1.0;

            // Pixel just before the run
            if col > 0 {
                province.note_adjacent(raster.color_at(i - 1), used_colors);
            }

            // Greedily extend the run rightward within this row
            let start = i;
            while i < raster.len() && i / width == row && raster.color_at(i) == target {
                i += 1;
                province.area += 1;
            }
            let run = i - start;

            // Pixel just after the run
            if col + run < width {
                province.note_adjacent(raster.color_at(i), used_colors);
            }

            // The run's full span one row above and below
            for j in start..start + run {
                if row > 0 {
                    province.note_adjacent(raster.color_at(j - width), used_colors);
                }
                if row + 1 < height {
                    province.note_adjacent(raster.color_at(j + width), used_colors);
                }
            }

            let p_end = p + run as f32 * dx;
            province.rects.push(Rect {
                x0: p,
                y0: q,
                x1: p_end,
                y1: q + dy,
            });
            center_sum.x += p + p_end;
            center_sum.y += q + q + dy;
        }

        province.adjacent_colors.remove(&target);

        // The centroid denominator is the stored rectangle-corner count, not
        // the pixel area. Existing map layouts depend on this normalization.
        if !province.rects.is_empty() {
            let corners = (province.rects.len() * 4) as f32;
            province.center = Vec2::new(center_sum.x / corners, center_sum.y / corners);
        }

        province
    }

    fn from_decl(decl: &ProvinceDecl) -> Self {
        Self {
            name: decl.name.clone(),
            color: decl.color,
            category: decl.category,
            population: decl.population,
            wealth: decl.wealth,
            food: decl.food,
            production: decl.production,
            strength: decl.strength,
            rects: Vec::new(),
            center: Vec2::default(),
            area: 0,
            adjacent_colors: HashSet::new(),
        }
    }

    fn note_adjacent(&mut self, color: Color, used_colors: &HashSet<Color>) {
        if used_colors.contains(&color) {
            self.adjacent_colors.insert(color);
        }
    }

    /// Total number of pixels carrying this province's color.
    pub fn area(&self) -> u64 {
        self.area
    }

    /// Accumulated centroid of the province's rectangles.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Colors found touching this province's boundary, its own excluded.
    pub fn adjacent_colors(&self) -> &HashSet<Color> {
        &self.adjacent_colors
    }

    pub fn is_adjacent(&self, color: Color) -> bool {
        self.adjacent_colors.contains(&color)
    }

    pub fn is_traversable(&self) -> bool {
        self.category.is_traversable()
    }

    /// Point-in-province test in normalized device coordinates.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.rects.iter().any(|rect| rect.contains(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(id: &str, color: Color) -> ProvinceDecl {
        ProvinceDecl {
            id: id.to_string(),
            color,
            name: id.to_string(),
            category: CityCategory::City,
            population: 0,
            wealth: 0,
            food: 0,
            production: 0,
            strength: 0,
        }
    }

    /// Build an RGB raster from one byte per pixel, mapping each byte to a
    /// grey color.
    fn raster_from_bytes(width: u32, height: u32, pixels: &[u8]) -> MapRaster {
        let data: Vec<u8> = pixels.iter().flat_map(|&v| [v, v, v]).collect();
        MapRaster::from_raw(width, height, 3, data).unwrap()
    }

    fn grey(v: u8) -> Color {
        Color::new(v, v, v)
    }

    #[test]
    fn test_area_matches_pixel_count() {
        #[rustfmt::skip]
        let raster = raster_from_bytes(4, 3, &[
            1, 1, 0, 1,
            0, 1, 1, 0,
            1, 0, 0, 1,
        ]);
        let used = HashSet::from([grey(1)]);

        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);
        assert_eq!(province.area(), 7);
    }

    #[test]
    fn test_rect_areas_sum_to_pixel_area() {
        #[rustfmt::skip]
        let raster = raster_from_bytes(5, 3, &[
            1, 1, 1, 0, 1,
            0, 0, 1, 1, 1,
            1, 1, 0, 0, 0,
        ]);
        let used = HashSet::from([grey(1)]);
        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);

        let dx = 2.0 / 5.0;
        let dy = -2.0 / 3.0;
        let total: f32 = province
            .rects()
            .iter()
            .map(|r| ((r.x1 - r.x0) / dx) * ((r.y1 - r.y0) / dy))
            .sum();
        assert!((total - province.area() as f32).abs() < 1e-3);
    }

    #[test]
    fn test_one_rect_per_row_run() {
        #[rustfmt::skip]
        let raster = raster_from_bytes(4, 2, &[
            1, 1, 0, 1,
            1, 1, 1, 1,
        ]);
        let used = HashSet::from([grey(1)]);
        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);

        // Row 0 splits into two runs, row 1 is a single run
        assert_eq!(province.rects().len(), 3);
    }

    #[test]
    fn test_centroid_uses_corner_count_denominator() {
        // Single 2x1 run in a 4x4 map
        #[rustfmt::skip]
        let raster = raster_from_bytes(4, 4, &[
            0, 0, 0, 0,
            0, 1, 1, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
        ]);
        let used = HashSet::from([grey(1)]);
        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);

        let dx = 2.0 / 4.0;
        let dy = -2.0 / 4.0;
        let p = 1.0 * dx - 1.0;
        let q = 1.0 * dy + 1.0;
        let p_end = p + 2.0 * dx;

        // One rect contributes (p + p_end, 2q + dy), divided by its 4 corners
        let expected = Vec2::new((p + p_end) / 4.0, (q + q + dy) / 4.0);
        assert!((province.center().x - expected.x).abs() < 1e-6);
        assert!((province.center().y - expected.y).abs() < 1e-6);
    }

    #[test]
    fn test_adjacency_detected_on_all_four_sides() {
        #[rustfmt::skip]
        let raster = raster_from_bytes(3, 3, &[
            0, 2, 0,
            3, 1, 4,
            0, 5, 0,
        ]);
        let used = HashSet::from([grey(1), grey(2), grey(3), grey(4), grey(5)]);
        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);

        assert!(province.is_adjacent(grey(2)));
        assert!(province.is_adjacent(grey(3)));
        assert!(province.is_adjacent(grey(4)));
        assert!(province.is_adjacent(grey(5)));
        assert!(!province.is_adjacent(grey(1)));
        assert_eq!(province.adjacent_colors().len(), 4);
    }

    #[test]
    fn test_unregistered_colors_are_not_adjacent() {
        #[rustfmt::skip]
        let raster = raster_from_bytes(3, 1, &[
            2, 1, 3,
        ]);
        // Only color 2 is registered; 3 is background
        let used = HashSet::from([grey(1), grey(2)]);
        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);

        assert!(province.is_adjacent(grey(2)));
        assert!(!province.is_adjacent(grey(3)));
    }

    #[test]
    fn test_disjoint_pixel_groups_accumulate() {
        // The same color in two separated corners is still one province
        #[rustfmt::skip]
        let raster = raster_from_bytes(4, 4, &[
            1, 1, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 1, 1,
        ]);
        let used = HashSet::from([grey(1)]);
        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);

        assert_eq!(province.area(), 4);
        assert_eq!(province.rects().len(), 2);
    }

    #[test]
    fn test_contains_hits_stored_rects() {
        #[rustfmt::skip]
        let raster = raster_from_bytes(2, 2, &[
            1, 0,
            0, 0,
        ]);
        let used = HashSet::from([grey(1)]);
        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);

        // Top-left pixel covers x in [-1, 0], y in [0, 1]
        assert!(province.contains(-0.5, 0.5));
        assert!(!province.contains(0.5, 0.5));
        assert!(!province.contains(-0.5, -0.5));
    }

    #[test]
    fn test_absent_color_yields_empty_province() {
        let raster = raster_from_bytes(2, 2, &[0, 0, 0, 0]);
        let used = HashSet::from([grey(1)]);
        let province = Province::extract(&raster, &decl("PR1", grey(1)), &used);

        assert_eq!(province.area(), 0);
        assert!(province.rects().is_empty());
        assert_eq!(province.center(), Vec2::default());
    }
}
