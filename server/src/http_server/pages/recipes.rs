use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use color_eyre::eyre::eyre;
use db::cooking::{search, Comment, MealType, Recipe, RecipeSearch, RecipeTag, SortOrder};
use maud::{html, Markup};
use uuid::Uuid;

use crate::{
    http_server::{
        current_user::{CurrentUser, MaybeUser},
        errors::{ServerError, WithStatus},
        flash::Flash,
        forms::{CommentForm, FormErrors, RecipeForm},
        templates::{
            base,
            buttons::{ButtonType, LinkButton, PostButton},
            pagination::pagination,
            recipes::{
                minutes, recipe_form, search_href, time_ago, MealTypeBadge, RecipeGrid, TagBadges,
            },
            Layout,
        },
        ResponseResult,
    },
    AppState,
};

/// Looks up a recipe from a path segment. Malformed ids are treated like
/// missing ones.
pub(crate) async fn find_recipe(
    app_state: &AppState,
    recipe_id: &str,
) -> Result<Recipe, ServerError> {
    let Ok(recipe_id) = recipe_id.parse::<Uuid>() else {
        return Err(ServerError::not_found("Recipe"));
    };

    Recipe::get_by_id(app_state.db(), recipe_id)
        .await?
        .with_status(StatusCode::NOT_FOUND)
}

fn detail_path(recipe: &Recipe) -> String {
    format!("/recipes/{}", recipe.recipe_id)
}

fn search_form(params: &RecipeSearch) -> Markup {
    let input = "mt-1 block w-full rounded border border-stone-300 px-3 py-2";
    let category = params.category.as_deref().unwrap_or_default();
    let tag = params.tags.as_deref().unwrap_or_default();
    let sort = params.sort_order();

    html! {
        form method="get" action="/recipes" class="bg-white rounded-lg shadow p-4 mb-8 grid gap-4 md:grid-cols-3" {
            div class="md:col-span-3" {
                label for="q" class="block font-medium" { "Search" }
                input type="search" id="q" name="q" value=[params.q.as_deref()]
                    placeholder="Search recipes, ingredients, or keywords..." class=(input);
            }

            div {
                label for="category" class="block font-medium" { "Meal Type" }
                select id="category" name="category" class=(input) {
                    option value="all" selected[category.is_empty() || category == "all"] { "All Meal Types" }
                    @for meal_type in MealType::ALL {
                        option value=(meal_type.as_str()) selected[category == meal_type.as_str()] {
                            (meal_type.display_name())
                        }
                    }
                }
            }

            div {
                label for="tags" class="block font-medium" { "Tag" }
                select id="tags" name="tags" class=(input) {
                    option value="" selected[tag.is_empty()] { "Any tag" }
                    @for recipe_tag in RecipeTag::ALL {
                        option value=(recipe_tag.as_str()) selected[tag == recipe_tag.as_str()] {
                            (recipe_tag.display_name())
                        }
                    }
                }
            }

            div {
                label for="sort" class="block font-medium" { "Sort by" }
                select id="sort" name="sort" class=(input) {
                    @for order in SortOrder::ALL {
                        option value=(order.as_param()) selected[order == sort] { (order.label()) }
                    }
                }
            }

            div {
                label for="max_prep_time" class="block font-medium" { "Max Preparation Time" }
                input type="number" min="0" id="max_prep_time" name="max_prep_time"
                    value=[params.max_prep_time.as_deref()] placeholder="Minutes" class=(input);
            }

            div {
                label for="max_cook_time" class="block font-medium" { "Max Cooking Time" }
                input type="number" min="0" id="max_cook_time" name="max_cook_time"
                    value=[params.max_cook_time.as_deref()] placeholder="Minutes" class=(input);
            }

            div class="flex items-end gap-2" {
                button type="submit" class=(ButtonType::Primary.classes()) { "Search" }
                @if params.has_filters() {
                    a href="/recipes" class="text-orange-700 hover:underline my-2" { "Clear filters" }
                }
            }
        }
    }
}

pub(crate) async fn recipes_index(
    State(app_state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Query(params): Query<RecipeSearch>,
) -> ResponseResult<Markup> {
    let results = search(app_state.db(), &params).await?;

    Ok(base(
        Layout::new("Recipes", user.user(), flash.take()),
        html! {
            div class="flex items-center justify-between mb-4" {
                h1 class="text-3xl font-bold" { "Recipes" }
                @if user.user().is_some() {
                    (LinkButton::primary(html! { "Add Recipe" }, "/recipes/new"))
                }
            }

            (search_form(&params))

            p class="text-stone-600 mb-4" {
                @if params.has_filters() {
                    (results.total()) " recipes found"
                    @if let Some(text) = params.text() {
                        " for “" (text) "”"
                    }
                } @else {
                    (results.total()) " recipes"
                }
            }

            @if results.recipes.is_empty() {
                div class="text-center py-12 text-stone-600" {
                    p { "No recipes match your search." }
                }
            } @else {
                (RecipeGrid(&results.recipes))
            }

            (pagination(&results.page, |n| search_href(&params.with_page(n))))
        },
    ))
}

pub(crate) async fn new_recipe(current_user: CurrentUser, flash: Flash) -> Markup {
    base(
        Layout::new("Add Recipe", Some(&current_user.user), flash.take()),
        html! {
            h1 class="text-3xl font-bold mb-6" { "Add a Recipe" }
            (recipe_form("/recipes", &RecipeForm::blank(), &FormErrors::default(), "Save Recipe"))
        },
    )
}

pub(crate) async fn create_recipe(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Form(form): Form<RecipeForm>,
) -> ResponseResult {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            let page = base(
                Layout::new("Add Recipe", Some(&current_user.user), vec![]),
                html! {
                    h1 class="text-3xl font-bold mb-6" { "Add a Recipe" }
                    (recipe_form("/recipes", &form, &errors, "Save Recipe"))
                },
            );

            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let recipe = Recipe::create(app_state.db(), current_user.user.user_id, &fields).await?;

    flash.success(format!("Recipe \"{}\" was added!", recipe.title));

    Ok(Redirect::to(&detail_path(&recipe)).into_response())
}

pub(crate) fn comment_form(recipe: &Recipe, form: &CommentForm, errors: &FormErrors) -> Markup {
    html! {
        form method="post" action=(format!("/recipes/{}/comments", recipe.recipe_id)) class="mt-4" {
            label for="body" class="block font-medium" { "Your Comment" }
            textarea id="body" name="body" rows="4"
                placeholder="Share your thoughts about this recipe, tips, or modifications you made..."
                class="mt-1 block w-full rounded border border-stone-300 px-3 py-2" { (form.body) }
            @for message in errors.for_field("body") {
                p class="mt-1 text-sm text-red-700" { (message) }
            }
            button type="submit" class=(ButtonType::Primary.classes()) { "Post Comment" }
        }
    }
}

/// The detail page, optionally with a comment form that failed validation.
pub(crate) async fn render_detail(
    app_state: &AppState,
    user: &MaybeUser,
    flashes: Vec<crate::http_server::flash::FlashMessage>,
    recipe: &Recipe,
    comment: (&CommentForm, &FormErrors),
) -> Result<Markup, ServerError> {
    let comments = Comment::list_approved_for_recipe(app_state.db(), recipe.recipe_id).await?;
    let is_author = user.is_author_of(recipe.author_user_id);
    let tags = recipe.tags();

    Ok(base(
        Layout::new(&recipe.title, user.user(), flashes),
        html! {
            article class="bg-white rounded-lg shadow overflow-hidden mb-8" {
                @if let Some(image_url) = &recipe.image_url {
                    img src=(image_url) alt=(recipe.title) class="w-full max-h-96 object-cover";
                }

                div class="p-6" {
                    (MealTypeBadge(recipe.meal_type))
                    h1 class="text-3xl font-bold mt-2" { (recipe.title) }
                    p class="text-stone-500 mb-4" {
                        "By " (recipe.author_username) " · " (time_ago(recipe.created_at))
                    }

                    @if !recipe.description.is_empty() {
                        p class="text-lg mb-4" { (recipe.description) }
                    }

                    dl class="grid grid-cols-3 gap-4 text-center bg-stone-100 rounded p-4 mb-6" {
                        div { dt class="text-sm text-stone-500" { "Prep" } dd class="font-semibold" { (minutes(recipe.prep_time)) } }
                        div { dt class="text-sm text-stone-500" { "Cook" } dd class="font-semibold" { (minutes(recipe.cook_time)) } }
                        div { dt class="text-sm text-stone-500" { "Serves" } dd class="font-semibold" { (recipe.servings) } }
                    }

                    (TagBadges(&tags))

                    div class="grid md:grid-cols-3 gap-8 mt-6" {
                        section {
                            h2 class="text-xl font-semibold mb-2" { "Ingredients" }
                            ul class="list-disc pl-5 space-y-1" {
                                @for line in recipe.ingredient_lines() {
                                    li { (line) }
                                }
                            }
                        }

                        section class="md:col-span-2" {
                            h2 class="text-xl font-semibold mb-2" { "Instructions" }
                            ol class="list-decimal pl-5 space-y-2" {
                                @for step in recipe.instruction_steps() {
                                    li { (step) }
                                }
                            }
                        }
                    }

                    @if is_author {
                        div class="mt-6 flex gap-2" {
                            (LinkButton::secondary(html! { "Edit" }, format!("/recipes/{}/edit", recipe.recipe_id)))
                            (PostButton::danger(html! { "Delete" }, format!("/recipes/{}/delete", recipe.recipe_id))
                                .with_confirm("Delete this recipe?"))
                        }
                    }
                }
            }

            section class="bg-white rounded-lg shadow p-6" {
                h2 class="text-xl font-semibold mb-4" { "Comments (" (comments.len()) ")" }

                @if comments.is_empty() {
                    p class="text-stone-600" { "No comments yet." }
                }

                @for c in &comments {
                    div class="border-b border-stone-200 py-3" {
                        p class="text-sm text-stone-500" {
                            strong { (c.author_username) } " · " (time_ago(c.created_at))
                        }
                        p class="whitespace-pre-line" { (c.body) }

                        @if user.is_author_of(c.author_user_id) {
                            div class="flex gap-4 text-sm mt-1" {
                                a href=(format!("/recipes/{}/comments/{}/edit", recipe.recipe_id, c.comment_id))
                                    class="text-orange-700 hover:underline" { "Edit" }
                                form method="post" action=(format!("/recipes/{}/comments/{}/delete", recipe.recipe_id, c.comment_id)) {
                                    button type="submit" class="text-red-700 hover:underline" { "Delete" }
                                }
                            }
                        }
                    }
                }

                @if user.user().is_some() {
                    (comment_form(recipe, comment.0, comment.1))
                } @else {
                    p class="mt-4" {
                        a href=(format!("/login?return_to=/recipes/{}", recipe.recipe_id)) class="text-orange-700 hover:underline" {
                            "Log in"
                        }
                        " to leave a comment."
                    }
                }
            }
        },
    ))
}

pub(crate) async fn recipe_detail(
    State(app_state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Path(recipe_id): Path<String>,
) -> ResponseResult<Markup> {
    let recipe = find_recipe(&app_state, &recipe_id).await?;

    render_detail(
        &app_state,
        &user,
        flash.take(),
        &recipe,
        (&CommentForm::default(), &FormErrors::default()),
    )
    .await
}

/// Loads a recipe for an author-only action. Anyone else is sent back to the
/// recipe with an error message.
async fn owned_recipe(
    app_state: &AppState,
    current_user: &CurrentUser,
    flash: &Flash,
    recipe_id: &str,
    action: &str,
) -> Result<Result<Recipe, Response>, ServerError> {
    let recipe = find_recipe(app_state, recipe_id).await?;

    if recipe.author_user_id != current_user.user.user_id {
        flash.error(format!("You can only {action} your own recipes!"));

        return Ok(Err(Redirect::to(&detail_path(&recipe)).into_response()));
    }

    Ok(Ok(recipe))
}

fn edit_page(
    current_user: &CurrentUser,
    recipe: &Recipe,
    form: &RecipeForm,
    errors: &FormErrors,
) -> Markup {
    base(
        Layout::new("Edit Recipe", Some(&current_user.user), vec![]),
        html! {
            h1 class="text-3xl font-bold mb-6" { "Edit " (recipe.title) }
            (recipe_form(&format!("/recipes/{}/edit", recipe.recipe_id), form, errors, "Update Recipe"))
            a href=(detail_path(recipe)) class="text-orange-700 hover:underline" { "Cancel" }
        },
    )
}

pub(crate) async fn edit_recipe(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Path(recipe_id): Path<String>,
) -> ResponseResult {
    let recipe = match owned_recipe(&app_state, &current_user, &flash, &recipe_id, "edit").await? {
        Ok(recipe) => recipe,
        Err(redirect) => return Ok(redirect),
    };

    Ok(edit_page(
        &current_user,
        &recipe,
        &RecipeForm::from_recipe(&recipe),
        &FormErrors::default(),
    )
    .into_response())
}

pub(crate) async fn update_recipe(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Path(recipe_id): Path<String>,
    Form(form): Form<RecipeForm>,
) -> ResponseResult {
    let recipe = match owned_recipe(&app_state, &current_user, &flash, &recipe_id, "edit").await? {
        Ok(recipe) => recipe,
        Err(redirect) => return Ok(redirect),
    };

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => {
            let page = edit_page(&current_user, &recipe, &form, &errors);

            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let recipe = recipe.update(app_state.db(), &fields).await?;

    flash.success(format!("Recipe \"{}\" updated successfully!", recipe.title));

    Ok(Redirect::to(&detail_path(&recipe)).into_response())
}

pub(crate) async fn delete_recipe(
    State(app_state): State<AppState>,
    current_user: CurrentUser,
    flash: Flash,
    Path(recipe_id): Path<String>,
) -> ResponseResult {
    let owned = owned_recipe(&app_state, &current_user, &flash, &recipe_id, "delete").await?;
    let recipe = match owned {
        Ok(recipe) => recipe,
        Err(redirect) => return Ok(redirect),
    };

    if !Recipe::delete(app_state.db(), recipe.recipe_id).await? {
        return Err(ServerError(eyre!("Recipe vanished before delete"), StatusCode::NOT_FOUND));
    }

    flash.success(format!("Recipe \"{}\" has been deleted successfully!", recipe.title));

    Ok(Redirect::to("/recipes").into_response())
}

/// Deleting only happens through the form; a plain visit goes back to the
/// recipe.
pub(crate) async fn delete_recipe_get(Path(recipe_id): Path<String>) -> ResponseResult<Redirect> {
    let recipe_id = recipe_id
        .parse::<Uuid>()
        .map_err(|_| ServerError::not_found("Recipe"))?;

    Ok(Redirect::to(&format!("/recipes/{recipe_id}")))
}
