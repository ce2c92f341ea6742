use std::collections::BTreeMap;

use db::cooking::{MealType, Recipe, RecipeFields, RecipeTag, TagList};
use serde::Deserialize;
use url::Url;

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 200;
const MAX_SERVINGS: i32 = 50;
const MAX_TOTAL_MINUTES: i64 = 600;
const COMMENT_MIN_CHARS: usize = 10;
const COMMENT_MAX_CHARS: usize = 1000;

const REQUIRED: &str = "This field is required.";

/// Validation messages keyed by field name, plus the ones about the form as
/// a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn for_field(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    pub fn has_field_errors(&self, field: &str) -> bool {
        !self.for_field(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }
}

/// The recipe form exactly as submitted, so it can be shown again with its
/// errors.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecipeForm {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub meal_type: String,
    pub recipe_tags: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
}

impl RecipeForm {
    pub fn blank() -> Self {
        Self {
            meal_type: MealType::default().as_str().to_string(),
            servings: "1".to_string(),
            ..Self::default()
        }
    }

    /// Prefills the edit form. Only the first stored tag can be selected.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            image_url: recipe.image_url.clone().unwrap_or_default(),
            meal_type: recipe.meal_type.as_str().to_string(),
            recipe_tags: recipe.tags().first().unwrap_or_default().to_string(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            prep_time: recipe.prep_time.to_string(),
            cook_time: recipe.cook_time.to_string(),
            servings: recipe.servings.to_string(),
        }
    }

    pub fn validate(&self) -> Result<RecipeFields, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        let title_chars = title.chars().count();
        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else if title_chars < TITLE_MIN_CHARS {
            errors.add("title", "Recipe title must be at least 3 characters long.");
        } else if title_chars > TITLE_MAX_CHARS {
            errors.add(
                "title",
                format!(
                    "Ensure this value has at most {TITLE_MAX_CHARS} characters (it has {title_chars})."
                ),
            );
        }

        let ingredients = self.ingredients.trim();
        if ingredients.is_empty() {
            errors.add("ingredients", REQUIRED);
        }
        let instructions = self.instructions.trim();
        if instructions.is_empty() {
            errors.add("instructions", REQUIRED);
        }

        let meal_type = match self.meal_type.trim() {
            "" => {
                errors.add("meal_type", REQUIRED);
                None
            }
            value => value.parse::<MealType>().map_or_else(
                |_| {
                    errors.add("meal_type", invalid_choice(value));
                    None
                },
                Some,
            ),
        };

        let tags = match self.recipe_tags.trim() {
            "" => Some(TagList::default()),
            value => value.parse::<RecipeTag>().map_or_else(
                |_| {
                    errors.add("recipe_tags", invalid_choice(value));
                    None
                },
                |tag| Some(TagList::from_tags([tag])),
            ),
        };

        let prep_time = minutes(&mut errors, "prep_time", &self.prep_time, "Preparation");
        let cook_time = minutes(&mut errors, "cook_time", &self.cook_time, "Cooking");

        let servings = match self.servings.trim() {
            "" => Some(1),
            value => match value.parse::<i32>() {
                Err(_) => {
                    errors.add("servings", "Enter a whole number.");
                    None
                }
                Ok(n) if n < 1 => {
                    errors.add("servings", "Ensure this value is greater than or equal to 1.");
                    None
                }
                Ok(n) if n > MAX_SERVINGS => {
                    errors.add(
                        "servings",
                        format!("Ensure this value is less than or equal to {MAX_SERVINGS}."),
                    );
                    None
                }
                Ok(n) => Some(n),
            },
        };

        let image_url = match self.image_url.trim() {
            "" => None,
            value => match Url::parse(value) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
                _ => {
                    errors.add("image_url", "Enter a valid URL.");
                    None
                }
            },
        };

        if let (Some(prep), Some(cook)) = (prep_time, cook_time) {
            if prep != 0 && cook != 0 && i64::from(prep) + i64::from(cook) > MAX_TOTAL_MINUTES {
                errors.add_non_field(
                    "Total cooking time seems unusually long. Please verify your times.",
                );
            }
        }

        match (meal_type, tags, prep_time, cook_time, servings) {
            (Some(meal_type), Some(tags), Some(prep_time), Some(cook_time), Some(servings))
                if errors.is_empty() =>
            {
                Ok(RecipeFields {
                    title: title.to_string(),
                    description: self.description.trim().to_string(),
                    ingredients: ingredients.to_string(),
                    instructions: instructions.to_string(),
                    prep_time,
                    cook_time,
                    servings,
                    image_url,
                    meal_type,
                    tags,
                })
            }
            _ => Err(errors),
        }
    }
}

fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

fn minutes(errors: &mut FormErrors, field: &'static str, value: &str, label: &str) -> Option<i32> {
    match value.trim() {
        "" => {
            errors.add(field, REQUIRED);
            None
        }
        value => match value.parse::<i32>() {
            Err(_) => {
                errors.add(field, "Enter a whole number.");
                None
            }
            Ok(n) if n < 0 => {
                errors.add(field, format!("{label} time cannot be negative."));
                None
            }
            Ok(n) => Some(n),
        },
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommentForm {
    pub body: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        let body = self.body.trim();
        let chars = body.chars().count();

        if body.is_empty() {
            errors.add("body", REQUIRED);
        } else if chars < COMMENT_MIN_CHARS {
            errors.add(
                "body",
                "Please write a more detailed comment (at least 10 characters).",
            );
        } else if chars > COMMENT_MAX_CHARS {
            errors.add(
                "body",
                "Comment is too long. Please keep it under 1000 characters.",
            );
        }

        if errors.is_empty() {
            Ok(body.to_string())
        } else {
            Err(errors)
        }
    }
}
