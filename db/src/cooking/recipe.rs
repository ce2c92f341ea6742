use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Type};
use uuid::Uuid;

use super::tags::TagList;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
pub enum MealType {
    #[serde(rename = "breakfast")]
    Breakfast,
    #[serde(rename = "lunch")]
    Lunch,
    #[default]
    #[serde(rename = "dinner")]
    Dinner,
    #[serde(rename = "snacks")]
    Snacks,
    #[serde(rename = "dessert")]
    Dessert,
    #[serde(rename = "beverages")]
    Beverages,
}

impl MealType {
    pub const ALL: [MealType; 6] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snacks,
        MealType::Dessert,
        MealType::Beverages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snacks => "snacks",
            MealType::Dessert => "dessert",
            MealType::Beverages => "beverages",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snacks => "Snacks & Appetizers",
            MealType::Dessert => "Desserts",
            MealType::Beverages => "Beverages",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown meal type: {0}")]
pub struct ParseMealTypeError(pub String);

impl std::str::FromStr for MealType {
    type Err = ParseMealTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .into_iter()
            .find(|meal_type| meal_type.as_str() == s)
            .ok_or_else(|| ParseMealTypeError(s.to_string()))
    }
}

/// Columns selected for every [`Recipe`] read. Expects `recipes r` joined
/// with `Users u` on the author.
macro_rules! recipe_columns {
    () => {
        "r.recipe_id, r.title, r.description, r.ingredients, r.instructions, \
         r.prep_time, r.cook_time, r.servings, r.author_user_id, r.image_url, \
         r.meal_type, r.recipe_tags, r.created_at, r.updated_at, \
         u.username AS author_username"
    };
}
pub(crate) use recipe_columns;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub recipe_id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: i32, // minutes
    pub cook_time: i32, // minutes
    pub servings: i32,
    pub author_user_id: Uuid,
    pub author_username: String,
    pub image_url: Option<String>,
    pub meal_type: MealType,
    pub recipe_tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything an author controls about a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub image_url: Option<String>,
    pub meal_type: MealType,
    pub tags: TagList,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeTitle {
    pub recipe_id: Uuid,
    pub title: String,
}

impl Recipe {
    #[tracing::instrument(err, skip(pool, fields), fields(title = %fields.title))]
    pub async fn create(
        pool: &PgPool,
        author_user_id: Uuid,
        fields: &RecipeFields,
    ) -> Result<Self> {
        let recipe = sqlx::query_as::<_, Recipe>(concat!(
            "
            WITH r AS (
                INSERT INTO recipes (
                    title, description, ingredients, instructions, prep_time,
                    cook_time, servings, image_url, meal_type, recipe_tags,
                    author_user_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING *
            )
            SELECT ",
            recipe_columns!(),
            "
            FROM r
            JOIN Users u ON u.user_id = r.author_user_id
            "
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.ingredients)
        .bind(&fields.instructions)
        .bind(fields.prep_time)
        .bind(fields.cook_time)
        .bind(fields.servings)
        .bind(&fields.image_url)
        .bind(fields.meal_type)
        .bind(fields.tags.to_field())
        .bind(author_user_id)
        .fetch_one(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn get_by_id(pool: &PgPool, recipe_id: Uuid) -> Result<Option<Self>> {
        let recipe = sqlx::query_as::<_, Recipe>(concat!(
            "SELECT ",
            recipe_columns!(),
            "
            FROM recipes r
            JOIN Users u ON u.user_id = r.author_user_id
            WHERE r.recipe_id = $1
            "
        ))
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn list_by_author(pool: &PgPool, author_user_id: Uuid) -> Result<Vec<Self>> {
        let recipes = sqlx::query_as::<_, Recipe>(concat!(
            "SELECT ",
            recipe_columns!(),
            "
            FROM recipes r
            JOIN Users u ON u.user_id = r.author_user_id
            WHERE r.author_user_id = $1
            ORDER BY r.created_at DESC
            "
        ))
        .bind(author_user_id)
        .fetch_all(pool)
        .await?;

        Ok(recipes)
    }

    /// A random sample, used for the featured section of the home page.
    pub async fn random(pool: &PgPool, limit: i64) -> Result<Vec<Self>> {
        let recipes = sqlx::query_as::<_, Recipe>(concat!(
            "SELECT ",
            recipe_columns!(),
            "
            FROM recipes r
            JOIN Users u ON u.user_id = r.author_user_id
            ORDER BY random()
            LIMIT $1
            "
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(recipes)
    }

    pub async fn list_titles(pool: &PgPool) -> Result<Vec<RecipeTitle>> {
        let titles = sqlx::query_as::<_, RecipeTitle>(
            "
            SELECT recipe_id, title
            FROM recipes
            ORDER BY title, recipe_id
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(titles)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Recipe counts per meal type, omitting meal types without recipes.
    pub async fn count_by_meal_type(pool: &PgPool) -> Result<Vec<(MealType, i64)>> {
        let counts = sqlx::query_as::<_, (MealType, i64)>(
            "
            SELECT meal_type, COUNT(*)
            FROM recipes
            GROUP BY meal_type
            ",
        )
        .fetch_all(pool)
        .await?;

        let mut counts: Vec<_> = MealType::ALL
            .into_iter()
            .filter_map(|meal_type| {
                counts
                    .iter()
                    .find(|(m, _)| *m == meal_type)
                    .map(|(_, count)| (meal_type, *count))
            })
            .collect();
        counts.retain(|(_, count)| *count > 0);

        Ok(counts)
    }

    /// Recipe counts per stored tag identifier.
    pub async fn count_by_tag(pool: &PgPool) -> Result<BTreeMap<String, i64>> {
        let fields = sqlx::query_scalar::<_, String>(
            "SELECT recipe_tags FROM recipes WHERE recipe_tags <> ''",
        )
        .fetch_all(pool)
        .await?;

        let mut counts = BTreeMap::new();
        for field in fields {
            for tag in TagList::parse(&field).iter() {
                *counts.entry(tag.to_string()).or_insert(0) += 1;
            }
        }

        Ok(counts)
    }

    #[tracing::instrument(err, skip(self, pool, fields), fields(recipe_id = %self.recipe_id))]
    pub async fn update(&self, pool: &PgPool, fields: &RecipeFields) -> Result<Self> {
        let updated = sqlx::query_as::<_, Recipe>(concat!(
            "
            WITH r AS (
                UPDATE recipes
                SET title = $2,
                    description = $3,
                    ingredients = $4,
                    instructions = $5,
                    prep_time = $6,
                    cook_time = $7,
                    servings = $8,
                    image_url = $9,
                    meal_type = $10,
                    recipe_tags = $11,
                    updated_at = NOW()
                WHERE recipe_id = $1
                RETURNING *
            )
            SELECT ",
            recipe_columns!(),
            "
            FROM r
            JOIN Users u ON u.user_id = r.author_user_id
            "
        ))
        .bind(self.recipe_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.ingredients)
        .bind(&fields.instructions)
        .bind(fields.prep_time)
        .bind(fields.cook_time)
        .bind(fields.servings)
        .bind(&fields.image_url)
        .bind(fields.meal_type)
        .bind(fields.tags.to_field())
        .fetch_one(pool)
        .await?;

        Ok(updated)
    }

    /// Comments and meal slots referencing the recipe go with it.
    #[tracing::instrument(err, skip(pool))]
    pub async fn delete(pool: &PgPool, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Widened so two large stored times can't overflow.
    pub fn total_time(&self) -> i64 {
        i64::from(self.prep_time) + i64::from(self.cook_time)
    }

    pub fn tags(&self) -> TagList {
        TagList::parse(&self.recipe_tags)
    }

    pub fn fields(&self) -> RecipeFields {
        RecipeFields {
            title: self.title.clone(),
            description: self.description.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
            image_url: self.image_url.clone(),
            meal_type: self.meal_type,
            tags: self.tags(),
        }
    }

    pub fn ingredient_lines(&self) -> Vec<&str> {
        self.ingredients
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Instruction lines with any hand-typed `1.` style numbering removed, so
    /// the page can number them itself.
    pub fn instruction_steps(&self) -> Vec<&str> {
        self.instructions
            .lines()
            .map(strip_step_number)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

fn strip_step_number(line: &str) -> &str {
    let line = line.trim();
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());

    if rest.len() == line.len() {
        return line;
    }

    match rest.strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cooking::tags::RecipeTag;
    use crate::users::User;

    pub(crate) fn fields(title: &str) -> RecipeFields {
        RecipeFields {
            title: title.to_string(),
            description: String::new(),
            ingredients: "1 cup flour\n2 eggs".to_string(),
            instructions: "1. Mix\n2. Bake".to_string(),
            prep_time: 10,
            cook_time: 20,
            servings: 2,
            image_url: None,
            meal_type: MealType::Dinner,
            tags: TagList::default(),
        }
    }

    fn recipe_with(ingredients: &str, instructions: &str) -> Recipe {
        Recipe {
            recipe_id: Uuid::new_v4(),
            title: "Pancakes".to_string(),
            description: String::new(),
            ingredients: ingredients.to_string(),
            instructions: instructions.to_string(),
            prep_time: 5,
            cook_time: 15,
            servings: 4,
            author_user_id: Uuid::new_v4(),
            author_username: "cook".to_string(),
            image_url: None,
            meal_type: MealType::Breakfast,
            recipe_tags: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn instruction_steps_strip_numbering_and_blank_lines() {
        let recipe = recipe_with(
            "",
            "1. Whisk the eggs\n\n  2.   Heat the pan\n10.Flip\nServe warm\n",
        );

        assert_eq!(
            recipe.instruction_steps(),
            vec!["Whisk the eggs", "Heat the pan", "Flip", "Serve warm"]
        );
    }

    #[test]
    fn step_number_needs_a_dot() {
        assert_eq!(strip_step_number("2 eggs, beaten"), "2 eggs, beaten");
        assert_eq!(strip_step_number("350F oven"), "350F oven");
        assert_eq!(strip_step_number("3. Stir"), "Stir");
    }

    #[test]
    fn ingredient_lines_skip_empty_lines() {
        let recipe = recipe_with("2 cups flour\r\n\r\n1 tsp salt\n", "");

        assert_eq!(recipe.ingredient_lines(), vec!["2 cups flour", "1 tsp salt"]);
        assert_eq!(recipe.total_time(), 20);
    }

    #[test]
    fn total_time_of_huge_times_does_not_wrap() {
        let recipe = Recipe {
            prep_time: i32::MAX,
            cook_time: 1,
            ..recipe_with("", "")
        };

        assert_eq!(recipe.total_time(), i64::from(i32::MAX) + 1);
    }

    #[test]
    fn meal_type_parses_identifiers_only() {
        assert_eq!("snacks".parse::<MealType>(), Ok(MealType::Snacks));
        assert_eq!(
            "Snacks".parse::<MealType>(),
            Err(ParseMealTypeError("Snacks".to_string()))
        );
        assert_eq!(MealType::default(), MealType::Dinner);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_update_and_delete(pool: PgPool) {
        let author = User::get_or_create_by_username(&pool, "chef").await.unwrap();

        let mut new_fields = fields("Lasagne");
        new_fields.tags = TagList::from_tags([RecipeTag::Italian, RecipeTag::Pasta]);
        let recipe = Recipe::create(&pool, author.user_id, &new_fields).await.unwrap();

        assert_eq!(recipe.author_username, "chef");
        assert_eq!(recipe.recipe_tags, "italian,pasta");
        assert_eq!(recipe.meal_type, MealType::Dinner);

        let mut changes = recipe.fields();
        changes.title = "Vegetable Lasagne".to_string();
        changes.meal_type = MealType::Lunch;
        changes.tags = TagList::from_tags([RecipeTag::Vegetarian]);
        let updated = recipe.update(&pool, &changes).await.unwrap();

        assert_eq!(updated.title, "Vegetable Lasagne");
        assert_eq!(updated.meal_type, MealType::Lunch);
        assert_eq!(updated.tags().first(), Some("vegetarian"));
        assert!(updated.updated_at >= recipe.updated_at);

        assert!(Recipe::delete(&pool, recipe.recipe_id).await.unwrap());
        assert!(!Recipe::delete(&pool, recipe.recipe_id).await.unwrap());
        assert!(Recipe::get_by_id(&pool, recipe.recipe_id)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn counts_by_meal_type_and_tag(pool: PgPool) {
        let author = User::get_or_create_by_username(&pool, "chef").await.unwrap();

        let mut soup = fields("Minestrone");
        soup.meal_type = MealType::Lunch;
        soup.tags = TagList::from_tags([RecipeTag::Soup, RecipeTag::Italian]);
        Recipe::create(&pool, author.user_id, &soup).await.unwrap();

        let mut pizza = fields("Margherita");
        pizza.tags = TagList::from_tags([RecipeTag::Pizza, RecipeTag::Italian]);
        Recipe::create(&pool, author.user_id, &pizza).await.unwrap();

        Recipe::create(&pool, author.user_id, &fields("Plain rice"))
            .await
            .unwrap();

        let by_meal = Recipe::count_by_meal_type(&pool).await.unwrap();
        assert_eq!(by_meal, vec![(MealType::Lunch, 1), (MealType::Dinner, 2)]);

        let by_tag = Recipe::count_by_tag(&pool).await.unwrap();
        assert_eq!(by_tag.get("italian"), Some(&2));
        assert_eq!(by_tag.get("soup"), Some(&1));
        assert_eq!(by_tag.get("vegan"), None);

        assert_eq!(Recipe::count(&pool).await.unwrap(), 3);
        assert_eq!(Recipe::random(&pool, 2).await.unwrap().len(), 2);
        assert_eq!(
            Recipe::list_by_author(&pool, author.user_id)
                .await
                .unwrap()
                .len(),
            3
        );
    }
}
