//! Recipe search: text, meal type, tag and time filters, sort order and
//! pagination, composed into one SQL query.

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::recipe::{recipe_columns, Recipe};

pub const PAGE_SIZE: i64 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Alphabetical,
    PrepTime,
    CookTime,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Newest,
        SortOrder::Alphabetical,
        SortOrder::PrepTime,
        SortOrder::CookTime,
    ];

    /// Unrecognised values fall back to newest first.
    pub fn from_param(param: &str) -> Self {
        match param.trim() {
            "alphabetical" => SortOrder::Alphabetical,
            "prep_time" => SortOrder::PrepTime,
            "cook_time" => SortOrder::CookTime,
            _ => SortOrder::Newest,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Alphabetical => "alphabetical",
            SortOrder::PrepTime => "prep_time",
            SortOrder::CookTime => "cook_time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest first",
            SortOrder::Alphabetical => "Alphabetical",
            SortOrder::PrepTime => "Quickest prep",
            SortOrder::CookTime => "Quickest cook",
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            SortOrder::Newest => " ORDER BY r.created_at DESC, r.recipe_id",
            SortOrder::Alphabetical => " ORDER BY r.title, r.recipe_id",
            SortOrder::PrepTime => " ORDER BY r.prep_time, r.recipe_id",
            SortOrder::CookTime => " ORDER BY r.cook_time, r.recipe_id",
        }
    }
}

/// Search parameters as they arrive in the query string. Every field is kept
/// as submitted so forms and pagination links can echo it back; the accessor
/// methods give the interpreted value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl RecipeSearch {
    pub fn text(&self) -> Option<&str> {
        non_empty(self.q.as_ref())
    }

    /// `all` is the "no filter" choice of the category dropdown.
    pub fn meal_type(&self) -> Option<&str> {
        non_empty(self.category.as_ref()).filter(|c| *c != "all")
    }

    pub fn tag(&self) -> Option<&str> {
        non_empty(self.tags.as_ref())
    }

    pub fn max_prep_time(&self) -> Option<i32> {
        non_empty(self.max_prep_time.as_ref()).and_then(|v| v.parse().ok())
    }

    pub fn max_cook_time(&self) -> Option<i32> {
        non_empty(self.max_cook_time.as_ref()).and_then(|v| v.parse().ok())
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
            .as_deref()
            .map_or(SortOrder::Newest, SortOrder::from_param)
    }

    pub fn has_filters(&self) -> bool {
        self.text().is_some()
            || self.meal_type().is_some()
            || self.tag().is_some()
            || self.max_prep_time().is_some()
            || self.max_cook_time().is_some()
    }

    pub fn with_page(&self, page: i64) -> Self {
        Self {
            page: Some(page.to_string()),
            ..self.clone()
        }
    }

    fn requested_page(&self) -> PageRequest {
        match non_empty(self.page.as_ref()) {
            None => PageRequest::First,
            Some(page) => page.parse().map_or(PageRequest::First, PageRequest::Number),
        }
    }

    fn push_filters(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(" WHERE TRUE");

        if let Some(text) = self.text() {
            let pattern = contains_pattern(text);
            query
                .push(" AND (r.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR r.description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR r.ingredients ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR r.instructions ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(meal_type) = self.meal_type() {
            query
                .push(" AND r.meal_type = ")
                .push_bind(meal_type.to_string());
        }

        if let Some(tag) = self.tag() {
            // Normalise the stored list to `,a,b,` so each tag is matched whole.
            query
                .push(
                    r" AND (',' || regexp_replace(btrim(r.recipe_tags), '\s*,\s*', ',', 'g') || ',') ILIKE ",
                )
                .push_bind(format!("%,{},%", escape_like(tag)));
        }

        if let Some(max_prep_time) = self.max_prep_time() {
            query
                .push(" AND r.prep_time <= ")
                .push_bind(max_prep_time);
        }

        if let Some(max_cook_time) = self.max_cook_time() {
            query
                .push(" AND r.cook_time <= ")
                .push_bind(max_cook_time);
        }
    }
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageRequest {
    First,
    Number(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub total: i64,
}

impl Page {
    /// An empty result still has one page. Out-of-range numbers land on the
    /// last page.
    fn resolve(request: PageRequest, total: i64, per_page: i64) -> Self {
        let num_pages = ((total + per_page - 1) / per_page).max(1);
        let number = match request {
            PageRequest::First => 1,
            PageRequest::Number(n) if (1..=num_pages).contains(&n) => n,
            PageRequest::Number(_) => num_pages,
        };

        Self {
            number,
            num_pages,
            total,
        }
    }

    fn offset(&self, per_page: i64) -> i64 {
        (self.number - 1) * per_page
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub recipes: Vec<Recipe>,
    pub page: Page,
}

impl SearchResults {
    pub fn total(&self) -> i64 {
        self.page.total
    }
}

#[tracing::instrument(err, skip(pool))]
pub async fn search(pool: &PgPool, search: &RecipeSearch) -> Result<SearchResults> {
    let mut count_query = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM recipes r JOIN Users u ON u.user_id = r.author_user_id",
    );
    search.push_filters(&mut count_query);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let page = Page::resolve(search.requested_page(), total, PAGE_SIZE);

    let mut query = QueryBuilder::<Postgres>::new(concat!(
        "SELECT ",
        recipe_columns!(),
        " FROM recipes r JOIN Users u ON u.user_id = r.author_user_id"
    ));
    search.push_filters(&mut query);
    query.push(search.sort_order().order_by());
    query
        .push(" LIMIT ")
        .push_bind(PAGE_SIZE)
        .push(" OFFSET ")
        .push_bind(page.offset(PAGE_SIZE));

    let recipes = query.build_query_as::<Recipe>().fetch_all(pool).await?;

    Ok(SearchResults { recipes, page })
}
