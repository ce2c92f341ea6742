use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;
use db::cooking::{MealType, Recipe, RecipeSearch, TagGroup, TagList};
use itertools::Itertools;
use maud::{html, Markup, Render};

use super::form_fields::{non_field_errors, number_input, select, text_input, textarea};
use crate::http_server::forms::{FormErrors, RecipeForm};

pub fn time_ago(at: DateTime<Utc>) -> String {
    HumanTime::from(at).to_string()
}

/// Link to the recipe list showing the results of `search`.
pub fn search_href(search: &RecipeSearch) -> String {
    match serde_urlencoded::to_string(search) {
        Ok(query) if !query.is_empty() => format!("/recipes?{query}"),
        _ => "/recipes".to_string(),
    }
}

pub fn minutes(total: impl Into<i64>) -> String {
    let total = total.into();
    match (total / 60, total % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

pub(crate) struct MealTypeBadge(pub MealType);

impl Render for MealTypeBadge {
    fn render(&self) -> Markup {
        html! {
          a href=(format!("/categories/{}", self.0.as_str()))
            class="inline-block text-xs font-semibold uppercase tracking-wide bg-orange-100 text-orange-800 rounded px-2 py-1" {
            (self.0.display_name())
          }
        }
    }
}

pub(crate) struct TagBadges<'a>(pub &'a TagList);

impl Render for TagBadges<'_> {
    fn render(&self) -> Markup {
        html! {
          @if self.0.is_empty() {
            span class="text-sm text-stone-500" { "No tags" }
          } @else {
            ul class="flex flex-wrap gap-2" {
              @for (identifier, name) in self.0.iter().zip(self.0.display_names()) {
                li {
                  a href=(search_href(&RecipeSearch { tags: Some(identifier.to_string()), ..RecipeSearch::default() }))
                    class="inline-block text-xs bg-stone-200 text-stone-700 rounded-full px-3 py-1 hover:bg-stone-300" {
                    (name)
                  }
                }
              }
            }
          }
        }
    }
}

pub(crate) struct RecipeCard<'a>(pub &'a Recipe);

impl Render for RecipeCard<'_> {
    fn render(&self) -> Markup {
        let recipe = self.0;
        let href = format!("/recipes/{}", recipe.recipe_id);

        html! {
          article class="bg-white rounded-lg shadow overflow-hidden flex flex-col" {
            @if let Some(image_url) = &recipe.image_url {
              a href=(href) {
                img src=(image_url) alt=(recipe.title) class="h-48 w-full object-cover";
              }
            }

            div class="p-4 flex flex-col gap-2 flex-grow" {
              (MealTypeBadge(recipe.meal_type))

              h3 class="text-lg font-semibold" {
                a href=(href) class="hover:text-orange-700" { (recipe.title) }
              }

              @if !recipe.description.is_empty() {
                p class="text-sm text-stone-600 line-clamp-3" { (recipe.description) }
              }

              p class="text-sm text-stone-500 mt-auto" {
                (minutes(recipe.total_time())) " · serves " (recipe.servings) " · by " (recipe.author_username)
              }
              p class="text-xs text-stone-500" { (recipe.tags().short_display()) }
            }
          }
        }
    }
}

pub(crate) struct RecipeGrid<'a>(pub &'a [Recipe]);

impl Render for RecipeGrid<'_> {
    fn render(&self) -> Markup {
        html! {
          div class="grid gap-6 sm:grid-cols-2 lg:grid-cols-3" {
            @for recipe in self.0 {
              (RecipeCard(recipe))
            }
          }
        }
    }
}

fn tag_select(selected: &str, errors: &FormErrors) -> Markup {
    html! {
      div class="mb-4" {
        label for="recipe_tags" class="block font-medium" { "Recipe Tags" }
        select id="recipe_tags" name="recipe_tags"
          class="mt-1 block w-full rounded border border-stone-300 px-3 py-2" {
          option value="" selected[selected.is_empty()] { "Select a tag (optional)" }
          @for group in TagGroup::ALL {
            optgroup label=(group.label()) {
              @for tag in group.tags() {
                option value=(tag.as_str()) selected[tag.as_str() == selected] { (tag.display_name()) }
              }
            }
          }
        }
        @for message in errors.for_field("recipe_tags") {
          p class="mt-1 text-sm text-red-700" { (message) }
        }
      }
    }
}

/// The create and edit form. Posts to `action`.
pub fn recipe_form(action: &str, form: &RecipeForm, errors: &FormErrors, submit: &str) -> Markup {
    let meal_types = MealType::ALL
        .iter()
        .map(|meal_type| (meal_type.as_str(), meal_type.display_name()))
        .collect_vec();

    html! {
      form method="post" action=(action) class="bg-white rounded-lg shadow p-6 max-w-2xl" {
        @if !errors.is_empty() {
          p class="text-red-700 mb-4" { "Please correct the errors below." }
        }
        (non_field_errors(errors))

        (text_input("title", "Title", &form.title, errors))
        (textarea("description", "Description", &form.description, 3, "Brief description of your recipe...", errors))
        (text_input("image_url", "Image URL", &form.image_url, errors))
        (select("meal_type", "Meal Type", meal_types, &form.meal_type, errors))
        (tag_select(&form.recipe_tags, errors))
        (textarea("ingredients", "Ingredients", &form.ingredients, 6, "List ingredients, one per line", errors))
        (textarea("instructions", "Instructions", &form.instructions, 8, "Step-by-step instructions, one per line", errors))

        div class="grid grid-cols-1 sm:grid-cols-3 gap-4" {
          (number_input("prep_time", "Preparation Time (minutes)", &form.prep_time, 0, None, errors))
          (number_input("cook_time", "Cooking Time (minutes)", &form.cook_time, 0, None, errors))
          (number_input("servings", "Servings", &form.servings, 1, Some(50), errors))
        }

        button type="submit" class=(super::buttons::ButtonType::Primary.classes()) { (submit) }
      }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_are_split_into_hours() {
        assert_eq!(minutes(45), "45 min");
        assert_eq!(minutes(60), "1 hr");
        assert_eq!(minutes(135), "2 hr 15 min");
        assert_eq!(minutes(0), "0 min");
        assert_eq!(minutes(i64::from(i32::MAX) + 1), "35791394 hr 8 min");
    }

    #[test]
    fn search_links_encode_their_filters() {
        let search = RecipeSearch {
            q: Some("mac & cheese".to_string()),
            sort: Some("alphabetical".to_string()),
            ..RecipeSearch::default()
        };

        assert_eq!(search_href(&search), "/recipes?q=mac+%26+cheese&sort=alphabetical");
        assert_eq!(search_href(&RecipeSearch::default()), "/recipes");
    }
}
