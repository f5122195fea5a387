//! Field rules for recipes submitted by clients.

use crate::error::ValidationErrors;
use crate::types::{Recipe, MAX_NAME_BYTES};
use std::collections::HashSet;

impl Recipe {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(!self.name.trim().is_empty(), "name", "must be provided");
        errors.check(
            self.name.len() <= MAX_NAME_BYTES,
            "name",
            "must not be more than 500 bytes long",
        );
        errors.check(self.servings >= 0, "servings", "must not be negative");

        errors.check(
            self.ingredients
                .iter()
                .all(|entry| !entry.ingredient.trim().is_empty()),
            "ingredients",
            "every ingredient must have a name",
        );
        errors.check(
            self.required_equipment
                .iter()
                .all(|name| !name.trim().is_empty()),
            "required_equipment",
            "must not contain empty names",
        );

        errors.check(
            self.instructions.iter().all(|step| step.step_number > 0),
            "instructions",
            "step numbers must be greater than zero",
        );
        let mut seen = HashSet::new();
        errors.check(
            self.instructions
                .iter()
                .all(|step| seen.insert(step.step_number)),
            "instructions",
            "step numbers must be unique",
        );
        errors.check(
            self.instructions
                .iter()
                .all(|step| !step.text.trim().is_empty()),
            "instructions",
            "every step must have text",
        );

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{IngredientEntry, InstructionStep, Recipe};

    fn step(step_number: i32, text: &str) -> InstructionStep {
        InstructionStep {
            step_number,
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_recipe() {
        let recipe = Recipe {
            name: "Pancakes".to_string(),
            ingredients: vec![IngredientEntry {
                ingredient: "flour".to_string(),
                ..Default::default()
            }],
            instructions: vec![step(1, "Mix"), step(3, "Fry")],
            ..Default::default()
        };
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_name_required_and_bounded() {
        let errors = Recipe::default().validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("must be provided"));

        let long = Recipe {
            name: "x".repeat(501),
            ..Default::default()
        };
        assert_eq!(
            long.validate().unwrap_err().get("name"),
            Some("must not be more than 500 bytes long")
        );

        let limit = Recipe {
            name: "x".repeat(500),
            ..Default::default()
        };
        assert!(limit.validate().is_ok());
    }

    #[test]
    fn test_duplicate_step_numbers_rejected() {
        let recipe = Recipe {
            name: "Soup".to_string(),
            instructions: vec![step(1, "Chop"), step(1, "Boil")],
            ..Default::default()
        };
        assert_eq!(
            recipe.validate().unwrap_err().get("instructions"),
            Some("step numbers must be unique")
        );
    }

    #[test]
    fn test_blank_children_rejected() {
        let recipe = Recipe {
            name: "Soup".to_string(),
            ingredients: vec![IngredientEntry::default()],
            required_equipment: vec![" ".to_string()],
            instructions: vec![step(0, "")],
            servings: -2,
            ..Default::default()
        };
        let errors = recipe.validate().unwrap_err();
        assert!(errors.get("ingredients").is_some());
        assert!(errors.get("required_equipment").is_some());
        assert_eq!(
            errors.get("instructions"),
            Some("step numbers must be greater than zero")
        );
        assert_eq!(errors.get("servings"), Some("must not be negative"));
    }
}
