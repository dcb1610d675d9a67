//! Core data models for the composite predictor

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical column names the models were trained on
pub mod columns {
    pub const PATCH_ANGLE: &str = "Угол нашивки, град";
    pub const PATCH_STEP: &str = "Шаг нашивки";
    pub const PATCH_DENSITY: &str = "Плотность нашивки";
    pub const MATRIX_FILLER_RATIO: &str = "Соотношение матрица-наполнитель";
    pub const DENSITY: &str = "Плотность, кг/м3";
    pub const ELASTIC_MODULUS: &str = "модуль упругости, ГПа";
    pub const HARDENER_AMOUNT: &str = "Количество отвердителя, м.%";
    pub const EPOXY_GROUP_CONTENT: &str = "Содержание эпоксидных групп,%_2";
    pub const FLASH_POINT: &str = "Температура вспышки, С_2";
    pub const SURFACE_DENSITY: &str = "Поверхностная плотность, г/м2";
    pub const RESIN_CONSUMPTION: &str = "Потребление смолы, г/м2";

    /// Predicted by the properties model, consumed by the ratio model
    pub const TENSILE_ELASTIC_MODULUS: &str = "Модуль упругости при растяжении, ГПа";
    pub const TENSILE_STRENGTH: &str = "Прочность при растяжении, МПа";

    /// Form inputs in display order
    pub const INPUT_FIELDS: [&str; 11] = [
        PATCH_ANGLE,
        PATCH_STEP,
        PATCH_DENSITY,
        MATRIX_FILLER_RATIO,
        DENSITY,
        ELASTIC_MODULUS,
        HARDENER_AMOUNT,
        EPOXY_GROUP_CONTENT,
        FLASH_POINT,
        SURFACE_DENSITY,
        RESIN_CONSUMPTION,
    ];
}

/// Named numeric inputs keyed by column name
///
/// Insertion order carries no meaning; models read values through
/// [`align`](crate::predictor::align) against their own feature list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(HashMap<String, f64>);

impl FeatureVector {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(name.into(), value)
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Copy of `self` with every entry of `other` merged in; `other` wins on collision
    pub fn merged_with(&self, other: &FeatureVector) -> FeatureVector {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.insert(name, value);
        }
        merged
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Ordered input names for one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureList(Vec<String>);

impl FeatureList {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// First name that occurs more than once, if any
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        self.iter().find(|name| !seen.insert(*name))
    }
}

/// Composite process parameters as collected by the input form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeInput {
    #[serde(rename = "Угол нашивки, град")]
    pub patch_angle_deg: f64,
    #[serde(rename = "Шаг нашивки")]
    pub patch_step: f64,
    #[serde(rename = "Плотность нашивки")]
    pub patch_density: f64,
    #[serde(rename = "Соотношение матрица-наполнитель")]
    pub matrix_filler_ratio: f64,
    #[serde(rename = "Плотность, кг/м3")]
    pub density_kg_m3: f64,
    #[serde(rename = "модуль упругости, ГПа")]
    pub elastic_modulus_gpa: f64,
    #[serde(rename = "Количество отвердителя, м.%")]
    pub hardener_amount_pct: f64,
    #[serde(rename = "Содержание эпоксидных групп,%_2")]
    pub epoxy_group_content_pct: f64,
    #[serde(rename = "Температура вспышки, С_2")]
    pub flash_point_c: f64,
    #[serde(rename = "Поверхностная плотность, г/м2")]
    pub surface_density_g_m2: f64,
    #[serde(rename = "Потребление смолы, г/м2")]
    pub resin_consumption_g_m2: f64,
}

impl CompositeInput {
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector::new()
            .with(columns::PATCH_ANGLE, self.patch_angle_deg)
            .with(columns::PATCH_STEP, self.patch_step)
            .with(columns::PATCH_DENSITY, self.patch_density)
            .with(columns::MATRIX_FILLER_RATIO, self.matrix_filler_ratio)
            .with(columns::DENSITY, self.density_kg_m3)
            .with(columns::ELASTIC_MODULUS, self.elastic_modulus_gpa)
            .with(columns::HARDENER_AMOUNT, self.hardener_amount_pct)
            .with(columns::EPOXY_GROUP_CONTENT, self.epoxy_group_content_pct)
            .with(columns::FLASH_POINT, self.flash_point_c)
            .with(columns::SURFACE_DENSITY, self.surface_density_g_m2)
            .with(columns::RESIN_CONSUMPTION, self.resin_consumption_g_m2)
    }
}

impl From<&CompositeInput> for FeatureVector {
    fn from(input: &CompositeInput) -> Self {
        input.to_features()
    }
}

/// Mechanical properties predicted by the first stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyPrediction {
    #[serde(rename = "Модуль упругости при растяжении, ГПа")]
    pub elastic_modulus: f64,
    #[serde(rename = "Прочность при растяжении, МПа")]
    pub tensile_strength: f64,
}

impl PropertyPrediction {
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector::new()
            .with(columns::TENSILE_ELASTIC_MODULUS, self.elastic_modulus)
            .with(columns::TENSILE_STRENGTH, self.tensile_strength)
    }
}

/// Matrix-to-filler ratio predicted by the second stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioPrediction {
    #[serde(rename = "Соотношение матрица-наполнитель")]
    pub matrix_filler_ratio: f64,
}

impl RatioPrediction {
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector::new().with(columns::MATRIX_FILLER_RATIO, self.matrix_filler_ratio)
    }
}

/// Result of the combined two-stage call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalComposite {
    pub properties: PropertyPrediction,
    pub ratio: RatioPrediction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other_on_collision() {
        let base = FeatureVector::new().with("a", 1.0).with("b", 2.0);
        let overlay = FeatureVector::new().with("b", 20.0).with("c", 30.0);
        let merged = base.merged_with(&overlay);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("a"), Some(1.0));
        assert_eq!(merged.get("b"), Some(20.0));
        assert_eq!(merged.get("c"), Some(30.0));
        // Base is untouched
        assert_eq!(base.get("b"), Some(2.0));
    }

    #[test]
    fn test_composite_input_covers_every_form_field() {
        let input = CompositeInput {
            patch_angle_deg: 0.0,
            patch_step: 4.0,
            patch_density: 57.0,
            matrix_filler_ratio: 1.857,
            density_kg_m3: 2030.0,
            elastic_modulus_gpa: 738.7,
            hardener_amount_pct: 30.0,
            epoxy_group_content_pct: 22.27,
            flash_point_c: 100.0,
            surface_density_g_m2: 210.0,
            resin_consumption_g_m2: 220.0,
        };
        let features = input.to_features();
        assert_eq!(features.len(), columns::INPUT_FIELDS.len());
        for name in columns::INPUT_FIELDS {
            assert!(features.contains(name), "missing {}", name);
        }
        assert_eq!(features.get(columns::DENSITY), Some(2030.0));
    }

    #[test]
    fn test_property_prediction_serializes_with_column_names() {
        let p = PropertyPrediction {
            elastic_modulus: 73.5,
            tensile_strength: 2466.1,
        };
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json[columns::TENSILE_ELASTIC_MODULUS], 73.5);
        assert_eq!(json[columns::TENSILE_STRENGTH], 2466.1);
    }

    #[test]
    fn test_feature_list_duplicate_detection() {
        assert_eq!(FeatureList::new(["a", "b", "a"]).first_duplicate(), Some("a"));
        assert_eq!(FeatureList::new(["a", "b"]).first_duplicate(), None);
    }
}
