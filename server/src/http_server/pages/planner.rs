use axum::{
    extract::{Query, State},
    response::Redirect,
    Form, Json,
};
use chrono::{Datelike, Days, NaiveDate, Utc};
use db::cooking::{week_start_for, Day, MealPlan, Recipe, SlotMeal, WeekGrid};
use maud::{html, Markup};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    http_server::{
        current_user::CurrentUser,
        errors::ServerError,
        flash::Flash,
        templates::{base, buttons::ButtonType, Layout},
        ResponseResult,
    },
    AppState,
};

/// Years a plan's week can fall in.
const PLANNABLE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// The Monday of the requested week. Missing, unreadable or out-of-range
/// dates mean the current week.
fn requested_week(week: Option<&str>) -> NaiveDate {
    let today = Utc::now().date_naive();
    let date = week
        .and_then(|week| NaiveDate::parse_from_str(week.trim(), "%Y-%m-%d").ok())
        .filter(|date| PLANNABLE_YEARS.contains(&date.year()))
        .unwrap_or(today);

    week_start_for(date)
}

fn planner_href(week_start: NaiveDate) -> String {
    format!("/planner?week={}", week_start.format("%Y-%m-%d"))
}

fn parse_slot(day: &str, meal: &str) -> Result<(Day, SlotMeal), ServerError> {
    let day = day.parse::<Day>().map_err(ServerError::bad_request)?;
    let meal = meal.parse::<SlotMeal>().map_err(ServerError::bad_request)?;

    Ok((day, meal))
}

/// Recipes can only be planned when they exist; anything else is a 404.
async fn planned_recipe(app_state: &AppState, recipe_id: &str) -> Result<Recipe, ServerError> {
    let recipe = match recipe_id.trim().parse::<Uuid>() {
        Ok(recipe_id) => Recipe::get_by_id(app_state.db(), recipe_id).await?,
        Err(_) => None,
    };

    recipe.ok_or_else(|| ServerError::not_found("Recipe"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WeekQuery {
    week: Option<String>,
}

fn slot_cell(week_start: NaiveDate, grid: &WeekGrid, day: Day, meal: SlotMeal) -> Markup {
    html! {
        @if let Some(slot) = grid.get(day, meal) {
            div class="bg-orange-50 rounded p-2 text-sm" {
                a href=(format!("/recipes/{}", slot.recipe_id)) class="font-medium hover:text-orange-700" {
                    (slot.recipe_title)
                }
                @if let Some(notes) = &slot.notes {
                    p class="text-xs text-stone-500" { (notes) }
                }
                form method="post" action="/planner/slots/clear" class="mt-1" {
                    input type="hidden" name="day" value=(day.as_str());
                    input type="hidden" name="meal_type" value=(meal.as_str());
                    input type="hidden" name="week" value=(week_start.format("%Y-%m-%d").to_string());
                    button type="submit" class="text-xs text-red-700 hover:underline" { "Remove" }
                }
            }
        } @else {
            span class="text-stone-300" { "—" }
        }
    }
}

pub(crate) async fn planner_page(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Query(query): Query<WeekQuery>,
) -> ResponseResult<Markup> {
    let week_start = requested_week(query.week.as_deref());
    let plan =
        MealPlan::get_or_create(app_state.db(), current_user.user.user_id, week_start).await?;
    let grid = plan.week(app_state.db()).await?;
    let recipes = Recipe::list_titles(app_state.db()).await?;

    let today = Utc::now().date_naive();
    let previous = week_start.checked_sub_days(Days::new(7)).unwrap_or(week_start);
    let next = week_start.checked_add_days(Days::new(7)).unwrap_or(week_start);
    let input = "mt-1 block w-full rounded border border-stone-300 px-3 py-2";

    Ok(base(
        Layout::new("Meal Planner", Some(&current_user.user), flash.take()),
        html! {
            div class="flex items-center justify-between my-6" {
                a href=(planner_href(previous)) class="text-orange-700 hover:underline" { "← Previous week" }
                h1 class="text-2xl font-bold" {
                    "Week of " (week_start.format("%B %-d, %Y"))
                }
                a href=(planner_href(next)) class="text-orange-700 hover:underline" { "Next week →" }
            }

            div class="overflow-x-auto" {
                table class="w-full table-fixed bg-white rounded-lg shadow" {
                    thead {
                        tr {
                            th class="w-28 p-2" {}
                            @for day in Day::ALL {
                                @let date = day.date_in_week(week_start);
                                th class=(if date == today { "p-2 bg-orange-100" } else { "p-2" }) {
                                    (day.short_name())
                                    br;
                                    span class="text-xs text-stone-500" { (date.format("%b %-d")) }
                                }
                            }
                        }
                    }
                    tbody {
                        @for meal in SlotMeal::ALL {
                            tr class="border-t border-stone-200 align-top" {
                                th class="p-2 text-left" { (meal.name()) }
                                @for day in Day::ALL {
                                    td class="p-1" { (slot_cell(week_start, &grid, day, meal)) }
                                }
                            }
                        }
                    }
                }
            }

            section class="bg-white rounded-lg shadow p-6 mt-8 max-w-2xl" {
                h2 class="text-xl font-semibold mb-4" { "Plan a meal" }

                @if recipes.is_empty() {
                    p class="text-stone-600" {
                        "There are no recipes to plan yet. "
                        a href="/recipes/new" class="text-orange-700 hover:underline" { "Add one" }
                    }
                } @else {
                    form method="post" action="/planner/slots" class="grid gap-4 sm:grid-cols-2" {
                        input type="hidden" name="week" value=(week_start.format("%Y-%m-%d").to_string());

                        div {
                            label for="day" class="block font-medium" { "Day" }
                            select id="day" name="day" class=(input) {
                                @for day in Day::ALL {
                                    option value=(day.as_str()) { (day.name()) }
                                }
                            }
                        }
                        div {
                            label for="meal_type" class="block font-medium" { "Meal" }
                            select id="meal_type" name="meal_type" class=(input) {
                                @for meal in SlotMeal::ALL {
                                    option value=(meal.as_str()) { (meal.name()) }
                                }
                            }
                        }
                        div class="sm:col-span-2" {
                            label for="recipe" class="block font-medium" { "Recipe" }
                            select id="recipe" name="recipe" class=(input) {
                                @for recipe in &recipes {
                                    option value=(recipe.recipe_id) { (recipe.title) }
                                }
                            }
                        }
                        div class="sm:col-span-2" {
                            label for="notes" class="block font-medium" { "Notes" }
                            input type="text" id="notes" name="notes" class=(input) placeholder="Optional";
                        }
                        div {
                            button type="submit" class=(ButtonType::Primary.classes()) { "Add to plan" }
                        }
                    }
                }
            }
        },
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignRequest {
    recipe_id: String,
    day: String,
    meal: String,
    #[serde(default)]
    week: Option<String>,
}

/// JSON endpoint for placing a recipe into a slot of the user's plan.
pub(crate) async fn assign_json(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<AssignRequest>,
) -> ResponseResult<Json<Value>> {
    let (day, meal) = parse_slot(&request.day, &request.meal)?;
    let recipe = planned_recipe(&app_state, &request.recipe_id).await?;

    let week_start = requested_week(request.week.as_deref());
    let plan =
        MealPlan::get_or_create(app_state.db(), current_user.user.user_id, week_start).await?;
    plan.assign(app_state.db(), day, meal, recipe.recipe_id, None)
        .await?;

    Ok(Json(json!({ "status": "success" })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SlotForm {
    day: String,
    meal_type: String,
    recipe: String,
    notes: String,
    week: Option<String>,
}

pub(crate) async fn assign_slot(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Form(form): Form<SlotForm>,
) -> ResponseResult<Redirect> {
    let (day, meal) = parse_slot(&form.day, &form.meal_type)?;
    let recipe = planned_recipe(&app_state, &form.recipe).await?;

    let week_start = requested_week(form.week.as_deref());
    let plan =
        MealPlan::get_or_create(app_state.db(), current_user.user.user_id, week_start).await?;

    let notes = Some(form.notes.trim().to_string()).filter(|notes| !notes.is_empty());
    plan.assign(app_state.db(), day, meal, recipe.recipe_id, notes)
        .await?;

    flash.success(format!(
        "Added {} to {} {}.",
        recipe.title,
        day.name(),
        meal.name().to_lowercase()
    ));

    Ok(Redirect::to(&planner_href(plan.week_start)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ClearForm {
    day: String,
    meal_type: String,
    week: Option<String>,
}

pub(crate) async fn clear_slot(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<ClearForm>,
) -> ResponseResult<Redirect> {
    let (day, meal) = parse_slot(&form.day, &form.meal_type)?;

    let week_start = requested_week(form.week.as_deref());
    let plan =
        MealPlan::get_or_create(app_state.db(), current_user.user.user_id, week_start).await?;
    plan.clear(app_state.db(), day, meal).await?;

    Ok(Redirect::to(&planner_href(plan.week_start)))
}
