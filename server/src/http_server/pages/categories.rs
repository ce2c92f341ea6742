use axum::extract::{Path, Query, State};
use db::cooking::{search, MealType, Recipe, RecipeSearch, RecipeTag, TagGroup};
use maud::{html, Markup};
use serde::Deserialize;

use crate::{
    http_server::{
        current_user::MaybeUser,
        errors::ServerError,
        flash::Flash,
        templates::{
            base,
            pagination::pagination,
            recipes::{search_href, RecipeGrid},
            Layout,
        },
        ResponseResult,
    },
    AppState,
};

pub(crate) async fn categories_index(
    State(app_state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
) -> ResponseResult<Markup> {
    let meal_types = Recipe::count_by_meal_type(app_state.db()).await?;
    let tag_counts = Recipe::count_by_tag(app_state.db()).await?;

    let groups: Vec<(TagGroup, Vec<(RecipeTag, i64)>)> = TagGroup::ALL
        .into_iter()
        .map(|group| {
            let tags = group
                .tags()
                .filter_map(|tag| tag_counts.get(tag.as_str()).map(|count| (tag, *count)))
                .collect::<Vec<_>>();
            (group, tags)
        })
        .filter(|(_, tags)| !tags.is_empty())
        .collect();

    Ok(base(
        Layout::new("Categories", user.user(), flash.take()),
        html! {
            h1 class="text-3xl font-bold mb-6" { "Categories" }

            section class="mb-10" {
                h2 class="text-2xl font-semibold mb-4" { "Meal Types" }

                @if meal_types.is_empty() {
                    p class="text-stone-600" { "No recipes yet." }
                } @else {
                    div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-3" {
                        @for (meal_type, count) in &meal_types {
                            a href=(format!("/categories/{}", meal_type.as_str()))
                                class="bg-white rounded-lg shadow p-4 hover:shadow-md" {
                                p class="text-lg font-semibold" { (meal_type.display_name()) }
                                p class="text-stone-600" { (count) " recipes" }
                            }
                        }
                    }
                }
            }

            @for (group, tags) in &groups {
                section class="mb-8" {
                    h2 class="text-xl font-semibold mb-3" { (group.label()) }
                    ul class="flex flex-wrap gap-2" {
                        @for (tag, count) in tags {
                            li {
                                a href=(search_href(&RecipeSearch { tags: Some(tag.as_str().to_string()), ..RecipeSearch::default() }))
                                    class="inline-block bg-stone-200 rounded-full px-3 py-1 hover:bg-stone-300" {
                                    (tag.display_name()) " (" (count) ")"
                                }
                            }
                        }
                    }
                }
            }
        },
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CategoryQuery {
    page: Option<String>,
}

pub(crate) async fn category_recipes(
    State(app_state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Path(category): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> ResponseResult<Markup> {
    let meal_type: MealType = category
        .parse()
        .map_err(|_| ServerError::not_found("Category"))?;

    let params = RecipeSearch {
        category: Some(meal_type.as_str().to_string()),
        page: query.page,
        ..RecipeSearch::default()
    };
    let results = search(app_state.db(), &params).await?;

    Ok(base(
        Layout::new(meal_type.display_name(), user.user(), flash.take()),
        html! {
            a href="/categories" class="text-orange-700 hover:underline" { "← All categories" }
            h1 class="text-3xl font-bold my-4" { (meal_type.display_name()) " Recipes" }
            p class="text-stone-600 mb-4" { (results.total()) " recipes" }

            @if results.recipes.is_empty() {
                p class="text-stone-600" { "No recipes in this category yet." }
            } @else {
                (RecipeGrid(&results.recipes))
            }

            (pagination(&results.page, |n| format!("/categories/{}?page={n}", meal_type.as_str())))
        },
    ))
}
