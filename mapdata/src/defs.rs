use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::MapError;

/// Settlement classification of a province, straight from the declaration
/// file's category column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CityCategory {
    SingleProvinceCapital,
    MultiProvinceCapital,
    City,
    Town,
    Village,
    Settlement,
    /// 6..=253: reserved values with no assigned meaning yet.
    Unassigned(u8),
    /// No settlement at all; treated like wasteland for traversal.
    NoCity,
    /// Untraversable terrain, excluded from the adjacency graph.
    Wasteland,
}

impl CityCategory {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::SingleProvinceCapital,
            1 => Self::MultiProvinceCapital,
            2 => Self::City,
            3 => Self::Town,
            4 => Self::Village,
            5 => Self::Settlement,
            254 => Self::NoCity,
            255 => Self::Wasteland,
            other => Self::Unassigned(other),
        }
    }

    /// Whether provinces of this category take part in adjacency and paths.
    pub fn is_traversable(self) -> bool {
        !matches!(self, Self::NoCity | Self::Wasteland)
    }
}

/// One parsed line of the province declaration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceDecl {
    pub id: String,
    pub color: Color,
    pub name: String,
    pub category: CityCategory,
    pub population: i32,
    pub wealth: i32,
    pub food: i32,
    pub production: i32,
    pub strength: i32,
}

/// Load province declarations from comma-separated lines:
///
/// ```text
/// # id, color, name, category[, population, wealth, food, production, strength]
/// PR1, ff0000, Redland, 2, 1200
/// ```
///
/// Malformed records are logged and skipped; the rest of the input is still
/// processed.
pub fn load_province_decls<R: Read>(reader: R) -> Result<Vec<ProvinceDecl>, MapError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut decls = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        match parse_province_record(&record) {
            Ok(decl) => decls.push(decl),
            Err(reason) => log::warn!("Skipping province record {}: {}", index + 1, reason),
        }
    }

    log::info!("Loaded {} province declarations", decls.len());
    Ok(decls)
}

/// Load province declarations from a file on disk.
pub fn load_province_decls_path(path: impl AsRef<Path>) -> Result<Vec<ProvinceDecl>, MapError> {
    let file = File::open(path)?;
    load_province_decls(BufReader::new(file))
}

fn parse_province_record(record: &csv::StringRecord) -> Result<ProvinceDecl, String> {
    if record.len() < 4 {
        return Err(format!("{} fields, at least 4 required", record.len()));
    }
    if record.len() > 9 {
        return Err(format!("{} fields, at most 9 supported", record.len()));
    }

    let field = |i: usize| record.get(i).unwrap_or("");

    let id = field(0).to_string();
    if id.is_empty() {
        return Err("empty id".to_string());
    }
    let color = Color::from_hex(field(1)).map_err(|_| format!("bad color {:?}", field(1)))?;
    let name = field(2).to_string();
    let category = field(3)
        .parse::<u8>()
        .map(CityCategory::from_raw)
        .map_err(|_| format!("bad category {:?}", field(3)))?;

    let stat = |i: usize| -> Result<i32, String> {
        if i < record.len() {
            field(i)
                .parse()
                .map_err(|_| format!("bad numeric field {:?}", field(i)))
        } else {
            Ok(0)
        }
    };

    Ok(ProvinceDecl {
        id,
        color,
        name,
        category,
        population: stat(4)?,
        wealth: stat(5)?,
        food: stat(6)?,
        production: stat(7)?,
        strength: stat(8)?,
    })
}

/// One parsed state block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDecl {
    pub id: String,
    pub name: String,
    pub provinces: Vec<String>,
}

/// Load state declarations from brace-delimited blocks:
///
/// ```text
/// ST1 {
///   name: "Kingdom of Redland"
///   provinces: PR1, PR2,
///     PR3
/// }
/// ```
///
/// A block missing its name or province list is logged and skipped.
pub fn load_state_decls<R: Read>(mut reader: R) -> Result<Vec<StateDecl>, MapError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut decls = Vec::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || !line.ends_with('{') {
            continue;
        }
        let Some(id) = line.split_whitespace().next() else {
            continue;
        };
        let id = id.to_string();

        let mut name = String::new();
        let mut provinces = Vec::new();
        let mut in_provinces = false;

        for body in lines.by_ref() {
            let body = body.trim();
            if body.is_empty() || body.starts_with('#') {
                continue;
            }
            let closes = body.ends_with('}');
            let body = body.trim_end_matches('}').trim();

            if let Some(rest) = body.strip_prefix("name:") {
                in_provinces = false;
                name = rest.trim().trim_matches('"').to_string();
            } else if let Some(rest) = body.strip_prefix("provinces:") {
                in_provinces = true;
                push_ids(rest, &mut provinces);
            } else if in_provinces {
                push_ids(body, &mut provinces);
            }

            if closes {
                break;
            }
        }

        if name.is_empty() {
            log::warn!("Skipping state {:?}: no name", id);
            continue;
        }
        if provinces.is_empty() {
            log::warn!("Skipping state {:?}: no provinces", id);
            continue;
        }
        decls.push(StateDecl {
            id,
            name,
            provinces,
        });
    }

    log::info!("Loaded {} state declarations", decls.len());
    Ok(decls)
}

/// Load state declarations from a file on disk.
pub fn load_state_decls_path(path: impl AsRef<Path>) -> Result<Vec<StateDecl>, MapError> {
    let file = File::open(path)?;
    load_state_decls(BufReader::new(file))
}

fn push_ids(list: &str, out: &mut Vec<String>) {
    for token in list.split(',') {
        let token = token.trim();
        if !token.is_empty() {
            out.push(token.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_raw() {
        assert_eq!(CityCategory::from_raw(0), CityCategory::SingleProvinceCapital);
        assert_eq!(CityCategory::from_raw(2), CityCategory::City);
        assert_eq!(CityCategory::from_raw(5), CityCategory::Settlement);
        assert_eq!(CityCategory::from_raw(6), CityCategory::Unassigned(6));
        assert_eq!(CityCategory::from_raw(253), CityCategory::Unassigned(253));
        assert_eq!(CityCategory::from_raw(254), CityCategory::NoCity);
        assert_eq!(CityCategory::from_raw(255), CityCategory::Wasteland);
    }

    #[test]
    fn test_traversability() {
        assert!(CityCategory::City.is_traversable());
        assert!(CityCategory::Unassigned(100).is_traversable());
        assert!(!CityCategory::NoCity.is_traversable());
        assert!(!CityCategory::Wasteland.is_traversable());
    }

    #[test]
    fn test_load_province_decls() {
        let input = "\
# comment line
PR1, ff0000, Redland, 2, 1200, 30, 10, 5, 8
PR2, 00ff00, Greenfield, 3
";
        let decls = load_province_decls(input.as_bytes()).unwrap();
        assert_eq!(decls.len(), 2);

        assert_eq!(decls[0].id, "PR1");
        assert_eq!(decls[0].color, Color::new(255, 0, 0));
        assert_eq!(decls[0].name, "Redland");
        assert_eq!(decls[0].category, CityCategory::City);
        assert_eq!(decls[0].population, 1200);
        assert_eq!(decls[0].strength, 8);

        assert_eq!(decls[1].id, "PR2");
        assert_eq!(decls[1].category, CityCategory::Town);
        assert_eq!(decls[1].population, 0);
    }

    #[test]
    fn test_short_record_is_skipped() {
        let input = "PR1, ff0000, Redland\nPR2, 00ff00, Greenfield, 3\n";
        let decls = load_province_decls(input.as_bytes()).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].id, "PR2");
    }

    #[test]
    fn test_long_record_is_skipped() {
        let input = "PR1, ff0000, Redland, 2, 1, 2, 3, 4, 5, 6\n";
        let decls = load_province_decls(input.as_bytes()).unwrap();
        assert!(decls.is_empty());
    }

    #[test]
    fn test_bad_color_or_category_is_skipped() {
        let input = "\
PR1, nothex, Redland, 2
PR2, 00ff00, Greenfield, tower
PR3, 0000ff, Blueburg, 4
";
        let decls = load_province_decls(input.as_bytes()).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].id, "PR3");
    }

    #[test]
    fn test_load_state_decls() {
        let input = "\
# states
ST1 {
  name: \"Kingdom of Redland\"
  provinces: PR1, PR2,
    PR3
}

ST2 {
  name: \"Green League\"
  provinces: PR4 }
";
        let decls = load_state_decls(input.as_bytes()).unwrap();
        assert_eq!(decls.len(), 2);

        assert_eq!(decls[0].id, "ST1");
        assert_eq!(decls[0].name, "Kingdom of Redland");
        assert_eq!(decls[0].provinces, vec!["PR1", "PR2", "PR3"]);

        assert_eq!(decls[1].id, "ST2");
        assert_eq!(decls[1].provinces, vec!["PR4"]);
    }

    #[test]
    fn test_state_without_name_or_provinces_is_skipped() {
        let input = "\
ST1 {
  provinces: PR1
}
ST2 {
  name: \"Empty\"
}
ST3 {
  name: \"Kept\"
  provinces: PR2
}
";
        let decls = load_state_decls(input.as_bytes()).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].id, "ST3");
    }
}
