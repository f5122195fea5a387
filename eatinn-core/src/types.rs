use crate::duration::Timing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Longest accepted recipe name, in bytes.
pub const MAX_NAME_BYTES: usize = 500;

/// Kind of image attached to a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Thumbnail,
    /// The display image; a recipe has at most one.
    Main,
    /// Belongs to exactly one instruction step.
    Step,
}

impl ImageType {
    pub const ALL: &'static [ImageType] = &[ImageType::Thumbnail, ImageType::Main, ImageType::Step];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Thumbnail => "thumbnail",
            ImageType::Main => "main",
            ImageType::Step => "step",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown image type: {s}"))
    }
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientEntry {
    /// Free-text ingredient name, shared across recipes.
    pub ingredient: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InstructionStep {
    /// Ordering key; unique within a recipe but not necessarily contiguous.
    pub step_number: i32,
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

/// A recipe aggregate: the recipe row plus everything it owns.
///
/// `id`, `created_at` and `version` are assigned by the store. Collections are
/// never absent; a missing or null list in JSON input reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Recipe {
    #[serde(default)]
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ingredients: Vec<IngredientEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub required_equipment: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub instructions: Vec<InstructionStep>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Timing::is_zero")]
    #[schema(value_type = String, example = "1h30m0s")]
    pub prep_time: Timing,
    #[serde(default, skip_serializing_if = "Timing::is_zero")]
    #[schema(value_type = String, example = "45m0s")]
    pub active_time: Timing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub public: bool,
    /// Zero means unset.
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub servings: i32,
    /// Starts at 1 and increases by one on every update.
    #[serde(default)]
    pub version: i32,
}

/// Listing row: the recipe's scalar fields plus its display image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_url: String,
    #[serde(skip_serializing_if = "Timing::is_zero")]
    #[schema(value_type = String)]
    pub prep_time: Timing,
    #[serde(skip_serializing_if = "Timing::is_zero")]
    #[schema(value_type = String)]
    pub active_time: Timing,
    pub public: bool,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub servings: i32,
    pub version: i32,
}

fn is_zero_i32(v: &i32) -> bool {
    *v == 0
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_type_round_trips_through_str() {
        for t in ImageType::ALL {
            assert_eq!(t.as_str().parse::<ImageType>().unwrap(), *t);
        }
        assert!("banner".parse::<ImageType>().is_err());
    }

    #[test]
    fn test_recipe_json_null_collections_read_as_empty() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"name":"Toast","ingredients":null,"instructions":null}"#,
        )
        .unwrap();
        assert_eq!(recipe.name, "Toast");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.required_equipment.is_empty());
        assert!(recipe.instructions.is_empty());
        assert_eq!(recipe.prep_time, Timing::ZERO);
    }

    #[test]
    fn test_recipe_json_shape() {
        let recipe = Recipe {
            id: 7,
            name: "Beef Stew".to_string(),
            ingredients: vec![IngredientEntry {
                ingredient: "beef".to_string(),
                amount: "2".to_string(),
                unit: "lb".to_string(),
                optional: false,
            }],
            required_equipment: vec!["dutch oven".to_string()],
            instructions: vec![InstructionStep {
                step_number: 1,
                text: "Brown the beef".to_string(),
                ..Default::default()
            }],
            prep_time: Timing::from_minutes(90),
            servings: 4,
            version: 1,
            ..Default::default()
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["prep_time"], "1h30m0s");
        assert_eq!(value["required_equipment"][0], "dutch oven");
        assert_eq!(value["instructions"][0]["step_number"], 1);
        assert!(value.get("active_time").is_none());
        assert!(value.get("description").is_none());
        assert!(value.get("created_at").is_none());
        assert!(value["instructions"][0].get("image_urls").is_none());
    }

    #[test]
    fn test_recipe_json_rejects_numeric_timing() {
        let result = serde_json::from_str::<Recipe>(r#"{"name":"Toast","prep_time":300}"#);
        assert!(result.is_err());
    }
}
