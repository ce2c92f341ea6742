//! Recipe tags.
//!
//! A recipe carries any number of tag identifiers, stored together in the
//! single `recipes.recipe_tags` text column joined by commas. [`TagList`]
//! owns the encoding in both directions; nothing else should split or join
//! that column by hand.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

const SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecipeTag {
    Italian,
    Mexican,
    Asian,
    Indian,
    American,
    Mediterranean,
    Vegetarian,
    Vegan,
    GlutenFree,
    Keto,
    Healthy,
    Pizza,
    Burger,
    Pasta,
    Soup,
    Salad,
    Chicken,
    Seafood,
    Beef,
    Pork,
    Baking,
}

impl RecipeTag {
    pub const ALL: [RecipeTag; 21] = [
        RecipeTag::Italian,
        RecipeTag::Mexican,
        RecipeTag::Asian,
        RecipeTag::Indian,
        RecipeTag::American,
        RecipeTag::Mediterranean,
        RecipeTag::Vegetarian,
        RecipeTag::Vegan,
        RecipeTag::GlutenFree,
        RecipeTag::Keto,
        RecipeTag::Healthy,
        RecipeTag::Pizza,
        RecipeTag::Burger,
        RecipeTag::Pasta,
        RecipeTag::Soup,
        RecipeTag::Salad,
        RecipeTag::Chicken,
        RecipeTag::Seafood,
        RecipeTag::Beef,
        RecipeTag::Pork,
        RecipeTag::Baking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeTag::Italian => "italian",
            RecipeTag::Mexican => "mexican",
            RecipeTag::Asian => "asian",
            RecipeTag::Indian => "indian",
            RecipeTag::American => "american",
            RecipeTag::Mediterranean => "mediterranean",
            RecipeTag::Vegetarian => "vegetarian",
            RecipeTag::Vegan => "vegan",
            RecipeTag::GlutenFree => "gluten_free",
            RecipeTag::Keto => "keto",
            RecipeTag::Healthy => "healthy",
            RecipeTag::Pizza => "pizza",
            RecipeTag::Burger => "burger",
            RecipeTag::Pasta => "pasta",
            RecipeTag::Soup => "soup",
            RecipeTag::Salad => "salad",
            RecipeTag::Chicken => "chicken",
            RecipeTag::Seafood => "seafood",
            RecipeTag::Beef => "beef",
            RecipeTag::Pork => "pork",
            RecipeTag::Baking => "baking",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RecipeTag::Italian => "Italian",
            RecipeTag::Mexican => "Mexican",
            RecipeTag::Asian => "Asian",
            RecipeTag::Indian => "Indian",
            RecipeTag::American => "American",
            RecipeTag::Mediterranean => "Mediterranean",
            RecipeTag::Vegetarian => "Vegetarian",
            RecipeTag::Vegan => "Vegan",
            RecipeTag::GlutenFree => "Gluten-Free",
            RecipeTag::Keto => "Keto/Low-Carb",
            RecipeTag::Healthy => "Healthy & Light",
            RecipeTag::Pizza => "Pizza",
            RecipeTag::Burger => "Burgers",
            RecipeTag::Pasta => "Pasta",
            RecipeTag::Soup => "Soups & Stews",
            RecipeTag::Salad => "Salads",
            RecipeTag::Chicken => "Chicken Dishes",
            RecipeTag::Seafood => "Seafood",
            RecipeTag::Beef => "Beef Dishes",
            RecipeTag::Pork => "Pork Dishes",
            RecipeTag::Baking => "Baking & Bread",
        }
    }

    pub fn group(&self) -> TagGroup {
        match self {
            RecipeTag::Italian
            | RecipeTag::Mexican
            | RecipeTag::Asian
            | RecipeTag::Indian
            | RecipeTag::American
            | RecipeTag::Mediterranean => TagGroup::Cuisine,
            RecipeTag::Vegetarian
            | RecipeTag::Vegan
            | RecipeTag::GlutenFree
            | RecipeTag::Keto
            | RecipeTag::Healthy => TagGroup::Dietary,
            RecipeTag::Pizza
            | RecipeTag::Burger
            | RecipeTag::Pasta
            | RecipeTag::Soup
            | RecipeTag::Salad
            | RecipeTag::Chicken
            | RecipeTag::Seafood
            | RecipeTag::Beef
            | RecipeTag::Pork
            | RecipeTag::Baking => TagGroup::PopularDishes,
        }
    }
}

impl fmt::Display for RecipeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecipeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecipeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown recipe tag: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagGroup {
    Cuisine,
    Dietary,
    PopularDishes,
}

impl TagGroup {
    pub const ALL: [TagGroup; 3] = [TagGroup::Cuisine, TagGroup::Dietary, TagGroup::PopularDishes];

    pub fn label(&self) -> &'static str {
        match self {
            TagGroup::Cuisine => "Cuisine",
            TagGroup::Dietary => "Dietary",
            TagGroup::PopularDishes => "Popular Dishes",
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = RecipeTag> + '_ {
        RecipeTag::ALL
            .into_iter()
            .filter(move |tag| tag.group() == *self)
    }
}

/// Display name for a stored identifier. Identifiers outside the known
/// vocabulary are shown as written.
pub fn display_name_for(identifier: &str) -> String {
    identifier
        .parse::<RecipeTag>()
        .map_or_else(|_| identifier.to_string(), |tag| tag.display_name().to_string())
}

/// The tags of one recipe, in stored order with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn parse(field: &str) -> Self {
        let tags = field
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .unique()
            .map(ToString::to_string)
            .collect();

        Self(tags)
    }

    pub fn from_tags(tags: impl IntoIterator<Item = RecipeTag>) -> Self {
        Self(
            tags.into_iter()
                .map(|tag| tag.as_str().to_string())
                .unique()
                .collect(),
        )
    }

    pub fn to_field(&self) -> String {
        self.0.iter().join(&SEPARATOR.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.iter().any(|tag| tag.eq_ignore_ascii_case(identifier))
    }

    pub fn display_names(&self) -> Vec<String> {
        self.0.iter().map(|tag| display_name_for(tag)).collect()
    }

    /// Compact form used in listings: at most two names, then a count.
    pub fn short_display(&self) -> String {
        let names = self.display_names();

        match names.len() {
            0 => "No tags".to_string(),
            1 | 2 => names.join(", "),
            n => format!("{} (+{} more)", names[..2].join(", "), n - 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_drops_blanks() {
        let tags = TagList::parse(" italian, ,pasta,, vegetarian ");

        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["italian", "pasta", "vegetarian"]);
    }

    #[test]
    fn parse_drops_duplicates_keeping_first() {
        let tags = TagList::parse("pasta,italian,pasta");

        assert_eq!(tags.to_field(), "pasta,italian");
    }

    #[test]
    fn empty_field_is_empty_list() {
        assert!(TagList::parse("").is_empty());
        assert!(TagList::parse(" , ").is_empty());
        assert_eq!(TagList::default().to_field(), "");
    }

    #[test]
    fn field_round_trips_without_spaces() {
        let tags = TagList::from_tags([RecipeTag::GlutenFree, RecipeTag::Soup]);

        assert_eq!(tags.to_field(), "gluten_free,soup");
        assert_eq!(TagList::parse(&tags.to_field()), tags);
    }

    #[test]
    fn unknown_identifiers_display_as_written() {
        let tags = TagList::parse("keto,grandmas_favourite");

        assert_eq!(
            tags.display_names(),
            vec!["Keto/Low-Carb".to_string(), "grandmas_favourite".to_string()]
        );
    }

    #[test]
    fn short_display_summarises_long_lists() {
        assert_eq!(TagList::default().short_display(), "No tags");
        assert_eq!(TagList::parse("vegan").short_display(), "Vegan");
        assert_eq!(
            TagList::parse("vegan,salad,healthy,asian").short_display(),
            "Vegan, Salads (+2 more)"
        );
    }

    #[test]
    fn contains_ignores_case() {
        let tags = TagList::parse("Seafood");

        assert!(tags.contains("seafood"));
        assert!(!tags.contains("sea"));
    }

    #[test]
    fn every_tag_belongs_to_exactly_one_group() {
        let grouped: usize = TagGroup::ALL.iter().map(|g| g.tags().count()).sum();

        assert_eq!(grouped, RecipeTag::ALL.len());
    }

    #[test]
    fn from_str_accepts_identifiers() {
        assert_eq!("gluten_free".parse::<RecipeTag>(), Ok(RecipeTag::GlutenFree));
        assert!("gluten-free".parse::<RecipeTag>().is_err());
    }
}
