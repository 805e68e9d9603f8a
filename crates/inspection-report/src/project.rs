//! Inspection project schema.
//!
//! A project is read once from the JSON export of the field application and
//! never written back. Loading validates the whole document up front so a
//! malformed export is rejected with every problem listed at once, instead of
//! failing halfway through rendering.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Path reported for projects parsed from memory.
const INLINE_SOURCE: &str = "<inline>";

/// A building inspection project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier assigned by the field application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Postal address of the inspected building.
    pub location: String,
    /// Free-text description of the building.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_characteristics: Option<String>,
    /// Levels in inspection order.
    pub levels: Vec<Level>,
}

/// A level (floor) of the building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub spaces: Vec<Space>,
}

/// A room or area within a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Observations grouped by location tag (`floor`, `wall`, `ceiling` or a
    /// custom label). Ordered so custom tags iterate deterministically.
    pub observations: BTreeMap<String, Vec<Observation>>,
}

/// A single inspection finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Identifier, unique across the project. Used to name extracted photos.
    pub id: String,
    pub text: String,
    /// Photos as `data:image/<ext>;base64,<payload>` strings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
}

impl Project {
    /// Load and validate a project from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] if the file does not exist,
    /// [`Error::ProjectRead`] if it cannot be read, [`Error::ProjectParse`] if
    /// it is not valid JSON and [`Error::ProjectInvalid`] if required fields
    /// are missing or have the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading project from {}", path.display());

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ProjectNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(Error::ProjectRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::parse(&text, path)
    }

    /// Parse and validate a project from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectParse`] or [`Error::ProjectInvalid`].
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::parse(text, Path::new(INLINE_SOURCE))
    }

    fn parse(text: &str, path: &Path) -> Result<Self> {
        let parse_error = |source: serde_json::Error| Error::ProjectParse {
            path: path.to_path_buf(),
            source,
        };

        let value: Value = serde_json::from_str(text).map_err(parse_error)?;

        let problems = validate(&value);
        if !problems.is_empty() {
            return Err(Error::ProjectInvalid {
                path: PathBuf::from(path),
                problems,
            });
        }

        serde_json::from_value(value).map_err(parse_error)
    }

    /// The building characteristics, if present and non-empty.
    #[must_use]
    pub fn characteristics(&self) -> Option<&str> {
        self.building_characteristics
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    /// Total number of spaces across all levels.
    #[must_use]
    pub fn space_count(&self) -> usize {
        self.levels.iter().map(|level| level.spaces.len()).sum()
    }

    /// Total number of observations across all spaces.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.spaces().map(Space::observation_count).sum()
    }

    /// Total number of photo entries, recognized or not.
    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.spaces()
            .flat_map(|space| space.observations.values().flatten())
            .map(|obs| obs.photos.len())
            .sum()
    }

    fn spaces(&self) -> impl Iterator<Item = &Space> {
        self.levels.iter().flat_map(|level| level.spaces.iter())
    }
}

impl Space {
    /// Number of observations under every location tag.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.observations.values().map(Vec::len).sum()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// === Validation ===

/// Collects schema problems as `path: reason` strings.
#[derive(Debug, Default)]
struct Validator {
    problems: Vec<String>,
}

/// Walk the raw JSON tree and report every missing or mistyped field.
fn validate(root: &Value) -> Vec<String> {
    let mut validator = Validator::default();
    validator.project(root);
    validator.problems
}

impl Validator {
    fn report(&mut self, path: &str, reason: impl std::fmt::Display) {
        let path = if path.is_empty() { "<root>" } else { path };
        self.problems.push(format!("{path}: {reason}"));
    }

    fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        if let Value::Object(map) = value {
            Some(map)
        } else {
            self.report(path, format_args!("expected object, found {}", kind(value)));
            None
        }
    }

    fn required<'a>(
        &mut self,
        map: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a Value> {
        let value = map.get(key);
        if value.is_none() {
            self.report(&join(parent, key), "missing");
        }
        value
    }

    fn required_str(&mut self, map: &Map<String, Value>, parent: &str, key: &str) {
        if let Some(value) = self.required(map, parent, key) {
            if !value.is_string() {
                self.report(
                    &join(parent, key),
                    format_args!("expected string, found {}", kind(value)),
                );
            }
        }
    }

    fn optional_str(&mut self, map: &Map<String, Value>, parent: &str, key: &str) {
        match map.get(key) {
            None | Some(Value::Null | Value::String(_)) => {}
            Some(other) => self.report(
                &join(parent, key),
                format_args!("expected string or null, found {}", kind(other)),
            ),
        }
    }

    fn required_array<'a>(
        &mut self,
        map: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a Vec<Value>> {
        match self.required(map, parent, key)? {
            Value::Array(items) => Some(items),
            other => {
                self.report(
                    &join(parent, key),
                    format_args!("expected array, found {}", kind(other)),
                );
                None
            }
        }
    }

    fn project(&mut self, root: &Value) {
        let Some(map) = self.object(root, "") else {
            return;
        };
        self.optional_str(map, "", "id");
        self.required_str(map, "", "location");
        self.optional_str(map, "", "buildingCharacteristics");

        if let Some(levels) = self.required_array(map, "", "levels") {
            for (i, level) in levels.iter().enumerate() {
                self.level(level, &format!("levels[{i}]"));
            }
        }
    }

    fn level(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else {
            return;
        };
        self.optional_str(map, path, "id");
        self.required_str(map, path, "name");

        if let Some(spaces) = self.required_array(map, path, "spaces") {
            for (i, space) in spaces.iter().enumerate() {
                self.space(space, &format!("{path}.spaces[{i}]"));
            }
        }
    }

    fn space(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else {
            return;
        };
        self.optional_str(map, path, "id");
        self.required_str(map, path, "name");

        let Some(observations) = self.required(map, path, "observations") else {
            return;
        };
        let observations_path = join(path, "observations");
        let Some(by_location) = self.object(observations, &observations_path) else {
            return;
        };

        for (tag, list) in by_location {
            let tag_path = join(&observations_path, tag);
            let Value::Array(items) = list else {
                self.report(&tag_path, format_args!("expected array, found {}", kind(list)));
                continue;
            };
            for (i, obs) in items.iter().enumerate() {
                self.observation(obs, &format!("{tag_path}[{i}]"));
            }
        }
    }

    fn observation(&mut self, value: &Value, path: &str) {
        let Some(map) = self.object(value, path) else {
            return;
        };
        self.required_str(map, path, "id");
        self.required_str(map, path, "text");

        match map.get("photos") {
            None | Some(Value::Null) => {}
            Some(Value::Array(photos)) => {
                for (i, photo) in photos.iter().enumerate() {
                    if !photo.is_string() {
                        self.report(
                            &format!("{path}.photos[{i}]"),
                            format_args!("expected string, found {}", kind(photo)),
                        );
                    }
                }
            }
            Some(other) => self.report(
                &join(path, "photos"),
                format_args!("expected array, found {}", kind(other)),
            ),
        }
    }
}

fn join(parent: &str, key: &str) -> String {
    let mut path = String::with_capacity(parent.len() + key.len() + 1);
    if !parent.is_empty() {
        path.push_str(parent);
        path.push('.');
    }
    path.push_str(key);
    path
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "id": "0a900d8a",
            "location": "12 rue des Lilas",
            "buildingCharacteristics": "Maison R+1",
            "levels": [{
                "id": "l1",
                "name": "Rez-de-chaussée",
                "spaces": [{
                    "id": "s1",
                    "name": "Cuisine",
                    "observations": {
                        "wall": [{
                            "id": "o1",
                            "text": "Fissure",
                            "location_in_space": "wall",
                            "photos": ["data:image/png;base64,AAAA"]
                        }],
                        "floor": [{ "id": "o2", "text": "Carrelage cassé", "photos": [] }]
                    }
                }]
            }]
        })
    }

    #[test]
    fn test_parse_valid_project() {
        let project = Project::from_json_str(&sample().to_string()).unwrap();

        assert_eq!(project.id.as_deref(), Some("0a900d8a"));
        assert_eq!(project.location, "12 rue des Lilas");
        assert_eq!(project.characteristics(), Some("Maison R+1"));
        assert_eq!(project.levels.len(), 1);
        assert_eq!(project.space_count(), 1);
        assert_eq!(project.observation_count(), 2);
        assert_eq!(project.photo_count(), 1);

        let space = &project.levels[0].spaces[0];
        assert_eq!(space.observations["wall"][0].id, "o1");
    }

    #[test]
    fn test_observation_tags_are_ordered() {
        let project = Project::from_json_str(&sample().to_string()).unwrap();
        let tags: Vec<_> = project.levels[0].spaces[0].observations.keys().collect();
        assert_eq!(tags, ["floor", "wall"]);
    }

    #[test]
    fn test_characteristics_missing_null_or_empty() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("buildingCharacteristics");
        let project = Project::from_json_str(&value.to_string()).unwrap();
        assert_eq!(project.characteristics(), None);

        value["buildingCharacteristics"] = Value::Null;
        let project = Project::from_json_str(&value.to_string()).unwrap();
        assert_eq!(project.characteristics(), None);

        value["buildingCharacteristics"] = json!("");
        let project = Project::from_json_str(&value.to_string()).unwrap();
        assert_eq!(project.characteristics(), None);
    }

    #[test]
    fn test_photos_missing_or_null_means_none() {
        let mut value = sample();
        value["levels"][0]["spaces"][0]["observations"]["wall"][0]["photos"] = Value::Null;
        value["levels"][0]["spaces"][0]["observations"]["floor"][0]
            .as_object_mut()
            .unwrap()
            .remove("photos");

        let project = Project::from_json_str(&value.to_string()).unwrap();
        assert_eq!(project.photo_count(), 0);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Project::from_json_str("{ \"location\": ").unwrap_err();
        assert!(matches!(err, Error::ProjectParse { .. }));
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let value = json!({
            "buildingCharacteristics": 3,
            "levels": [
                { "spaces": [] },
                {
                    "name": "R+1",
                    "spaces": [{
                        "name": 7,
                        "observations": {
                            "wall": [{ "id": "o1" }],
                            "custom": "oops"
                        }
                    }]
                }
            ]
        });

        let err = Project::from_json_str(&value.to_string()).unwrap_err();
        let Error::ProjectInvalid { problems, .. } = err else {
            panic!("expected ProjectInvalid, got {err:?}");
        };

        assert_eq!(
            problems,
            vec![
                "location: missing",
                "buildingCharacteristics: expected string or null, found number",
                "levels[0].name: missing",
                "levels[1].spaces[0].name: expected string, found number",
                "levels[1].spaces[0].observations.custom: expected array, found string",
                "levels[1].spaces[0].observations.wall[0].text: missing",
            ]
        );
    }

    #[test]
    fn test_validation_rejects_non_object_root() {
        let err = Project::from_json_str("[]").unwrap_err();
        let Error::ProjectInvalid { problems, .. } = err else {
            panic!("expected ProjectInvalid");
        };
        assert_eq!(problems, vec!["<root>: expected object, found array"]);
    }

    #[test]
    fn test_validation_rejects_non_string_photo() {
        let mut value = sample();
        value["levels"][0]["spaces"][0]["observations"]["wall"][0]["photos"] = json!([1]);

        let err = Project::from_json_str(&value.to_string()).unwrap_err();
        let Error::ProjectInvalid { problems, .. } = err else {
            panic!("expected ProjectInvalid");
        };
        assert_eq!(
            problems,
            vec!["levels[0].spaces[0].observations.wall[0].photos[0]: expected string, found number"]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Project::load("/nonexistent/projet.json").unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projet.json");
        std::fs::write(&path, sample().to_string()).unwrap();

        let project = Project::load(&path).unwrap();
        assert_eq!(project.location, "12 rue des Lilas");
    }

    #[test]
    fn test_load_reports_file_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Project::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
