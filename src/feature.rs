use crate::element::Tags;
use crate::error::{ConvertError, Result};
use geo::Geometry;
use serde_json::{Map, Value};

/// A geometry together with the tags of the element it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    geometry: Geometry<f64>,
    tags: Tags,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>, tags: Tags) -> Self {
        Self { geometry, tags }
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Sets a tag, replacing any previous value for `key`.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn get_tag(&self, key: &str) -> Result<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConvertError::MissingTag {
                key: key.to_string(),
            })
    }

    /// Snapshot as a GeoJSON feature with the tags as properties.
    ///
    /// The snapshot owns its data; later tag changes do not show up in it.
    pub fn export(&self) -> geojson::Feature {
        let properties: Map<String, Value> = self
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

impl TryFrom<geojson::Feature> for Feature {
    type Error = ConvertError;

    fn try_from(feature: geojson::Feature) -> Result<Self> {
        let geometry = feature.geometry.ok_or_else(|| ConvertError::InvalidGeoJson {
            reason: "feature has no geometry".to_string(),
        })?;
        let geometry = Geometry::<f64>::try_from(geometry.value).map_err(|e| {
            ConvertError::InvalidGeoJson {
                reason: e.to_string(),
            }
        })?;

        let mut tags = Tags::new();
        for (key, value) in feature.properties.unwrap_or_default() {
            match value {
                Value::String(value) => {
                    tags.insert(key, value);
                }
                other => {
                    return Err(ConvertError::InvalidGeoJson {
                        reason: format!("property {key:?} is not a string: {other}"),
                    })
                }
            }
        }

        Ok(Feature::new(geometry, tags))
    }
}
