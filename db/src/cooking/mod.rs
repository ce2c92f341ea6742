pub mod comments;
pub mod meal_planning;
pub mod recipe;
pub mod search;
pub mod tags;

pub use comments::{Comment, PendingComment};
pub use meal_planning::{week_start_for, Day, MealPlan, MealSlot, SlotMeal, WeekGrid};
pub use recipe::{MealType, Recipe, RecipeFields, RecipeTitle};
pub use search::{search, Page, RecipeSearch, SearchResults, SortOrder, PAGE_SIZE};
pub use tags::{RecipeTag, TagGroup, TagList};
