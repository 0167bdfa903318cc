use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::card::QuizMode;
use crate::error::QuizError;

// Reads an explicit `null` the same way as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    let value: Option<T> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// One feature of a region file. Only the quiz-relevant properties are read;
/// anything else a feature carries (geometry, colour, ...) is ignored.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Subregion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub capital: Option<String>,
    pub leader: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub landmarks: Vec<String>,
}

impl Subregion {
    pub fn named<S: Into<String>>(name: S) -> Subregion {
        Subregion {
            name: name.into(),
            ..Subregion::default()
        }
    }
}

/// Collection-level flags saying which quiz modes the data can support.
/// A missing flag is taken to mean the data is there.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct RegionProperties {
    pub subregions_have_names: Option<bool>,
    pub subregions_have_capitals: Option<bool>,
    pub subregions_have_leaders: Option<bool>,
    pub subregions_have_flags: Option<bool>,
    pub subregions_have_landmarks: Option<bool>,
    pub subregion_type: Option<String>,
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    properties: Option<RegionProperties>,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Subregion>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub name: String,
    pub properties: RegionProperties,
    subregions: Vec<Subregion>,
}

impl Region {
    pub fn from_json(name: &str, json: &str) -> Result<Region, serde_json::Error> {
        let collection: FeatureCollection = serde_json::from_str(json)?;
        Ok(Region {
            name: name.to_string(),
            properties: collection.properties.unwrap_or_default(),
            subregions: collection
                .features
                .into_iter()
                .map(|feature| feature.properties.unwrap_or_default())
                .collect(),
        })
    }

    pub fn load(name: &str, file: &Path) -> Result<Region, QuizError> {
        let json = fs::read_to_string(file).map_err(|err| QuizError::io(file, err))?;
        Region::from_json(name, &json).map_err(|err| QuizError::json(file, err))
    }

    /// Subregions in the order the data file lists them.
    pub fn subregions(&self) -> &[Subregion] {
        &self.subregions
    }

    pub fn supports(&self, mode: QuizMode) -> bool {
        let flag = match mode {
            QuizMode::Name => self.properties.subregions_have_names,
            QuizMode::Capital => self.properties.subregions_have_capitals,
            QuizMode::Leader => self.properties.subregions_have_leaders,
            QuizMode::Flag => self.properties.subregions_have_flags,
            QuizMode::Landmarks => self.properties.subregions_have_landmarks,
        };
        flag.unwrap_or(true)
    }
}

/// "the world/north america" -> "North America"
pub fn display_name(region_path: &str) -> String {
    let last = region_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or("");
    last.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Clone, Debug)]
struct RegionEntry {
    name: String,
    file: PathBuf,
}

/// Every playable region under a data directory laid out as
/// `<data>/<region path>/<Name>.json`.
#[derive(Clone, Debug, Default)]
pub struct RegionCatalog {
    regions: BTreeMap<String, RegionEntry>,
}

impl RegionCatalog {
    pub fn scan<P: AsRef<Path>>(data_dir: P) -> Result<RegionCatalog, QuizError> {
        let data_dir = data_dir.as_ref();
        let mut catalog = RegionCatalog::default();
        catalog.scan_dir(data_dir, &mut Vec::new())?;
        info!(
            "Found {} playable regions under {:?}",
            catalog.regions.len(),
            data_dir
        );
        Ok(catalog)
    }

    fn scan_dir(&mut self, dir: &Path, region_path: &mut Vec<String>) -> Result<(), QuizError> {
        let entries = fs::read_dir(dir).map_err(|err| QuizError::io(dir, err))?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| QuizError::io(dir, err))?;
            children.push(entry.path());
        }
        children.sort();

        for child in children {
            if child.is_dir() {
                let segment = match child.file_name().and_then(|name| name.to_str()) {
                    Some(segment) => segment.to_string(),
                    None => {
                        warn!("Skipping directory with non UTF-8 name: {:?}", child);
                        continue;
                    }
                };
                region_path.push(segment);
                self.scan_dir(&child, region_path)?;
                region_path.pop();
            } else if child.extension().map_or(false, |ext| ext == "json") {
                if region_path.is_empty() {
                    debug!("Ignoring {:?}, it has no region path", child);
                    continue;
                }
                let name = match child.file_stem().and_then(|stem| stem.to_str()) {
                    Some(name) => name.to_string(),
                    None => {
                        warn!("Skipping region file with non UTF-8 name: {:?}", child);
                        continue;
                    }
                };
                self.regions.insert(
                    region_path.join("/"),
                    RegionEntry {
                        name,
                        file: child.clone(),
                    },
                );
            }
        }
        Ok(())
    }

    pub fn has(&self, region_path: &str) -> bool {
        self.regions.contains_key(region_path)
    }

    pub fn name(&self, region_path: &str) -> Option<&str> {
        self.regions
            .get(region_path)
            .map(|entry| entry.name.as_str())
    }

    pub fn load(&self, region_path: &str) -> Result<Region, QuizError> {
        let entry = self
            .regions
            .get(region_path)
            .ok_or_else(|| QuizError::UnknownRegion(region_path.to_string()))?;
        Region::load(&entry.name, &entry.file)
    }

    /// Sorted region paths.
    pub fn playable(&self) -> Vec<&str> {
        self.regions.keys().map(|path| path.as_str()).collect()
    }
}
