use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn short_name(&self) -> &'static str {
        &self.name()[..3]
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }

    fn offset(self) -> u64 {
        Day::ALL
            .iter()
            .position(|day| *day == self)
            .map_or(0, |i| i as u64)
    }

    pub fn date_in_week(self, week_start: NaiveDate) -> NaiveDate {
        week_start
            .checked_add_days(Days::new(self.offset()))
            .unwrap_or(week_start)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown day: {0}")]
pub struct ParseDayError(pub String);

impl std::str::FromStr for Day {
    type Err = ParseDayError;

    /// Accepts full or three-letter day names in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Day::ALL
            .into_iter()
            .find(|day| {
                day.as_str().eq_ignore_ascii_case(wanted)
                    || day.short_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ParseDayError(s.to_string()))
    }
}

/// The meals a day in the planner is divided into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SlotMeal {
    Breakfast,
    Elevenses,
    Lunch,
    Dinner,
    Snack,
}

impl SlotMeal {
    pub const ALL: [SlotMeal; 5] = [
        SlotMeal::Breakfast,
        SlotMeal::Elevenses,
        SlotMeal::Lunch,
        SlotMeal::Dinner,
        SlotMeal::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotMeal::Breakfast => "breakfast",
            SlotMeal::Elevenses => "elevenses",
            SlotMeal::Lunch => "lunch",
            SlotMeal::Dinner => "dinner",
            SlotMeal::Snack => "snack",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SlotMeal::Breakfast => "Breakfast",
            SlotMeal::Elevenses => "Elevenses",
            SlotMeal::Lunch => "Lunch",
            SlotMeal::Dinner => "Dinner",
            SlotMeal::Snack => "Snack",
        }
    }
}

impl fmt::Display for SlotMeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown meal: {0}")]
pub struct ParseSlotMealError(pub String);

impl std::str::FromStr for SlotMeal {
    type Err = ParseSlotMealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SlotMeal::ALL
            .into_iter()
            .find(|meal| meal.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseSlotMealError(s.to_string()))
    }
}

/// The Monday on or before `date`.
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    let days_since_monday = u64::from(date.weekday().num_days_from_monday());

    date.checked_sub_days(Days::new(days_since_monday))
        .unwrap_or(date)
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MealPlan {
    pub meal_plan_id: Uuid,
    pub user_id: Uuid,
    pub week_start: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MealSlot {
    pub meal_slot_id: Uuid,
    pub meal_plan_id: Uuid,
    pub day: Day,
    pub meal_type: SlotMeal,
    pub recipe_id: Uuid,
    pub recipe_title: String,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MealPlan {
    /// One plan per user and week; `week_start` is normalised to its Monday.
    #[tracing::instrument(err, skip(pool))]
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Self> {
        let meal_plan = sqlx::query_as::<_, MealPlan>(
            "
            INSERT INTO meal_plans (user_id, week_start)
            VALUES ($1, $2)
            ON CONFLICT (user_id, week_start) DO UPDATE SET week_start = EXCLUDED.week_start
            RETURNING meal_plan_id, user_id, week_start, created_at
            ",
        )
        .bind(user_id)
        .bind(week_start_for(week_start))
        .fetch_one(pool)
        .await?;

        Ok(meal_plan)
    }

    pub async fn slots(&self, pool: &PgPool) -> Result<Vec<MealSlot>> {
        let slots = sqlx::query_as::<_, MealSlot>(
            "
            SELECT
                s.meal_slot_id,
                s.meal_plan_id,
                s.day,
                s.meal_type,
                s.recipe_id,
                r.title AS recipe_title,
                s.notes,
                s.updated_at
            FROM meal_slots s
            JOIN recipes r ON r.recipe_id = s.recipe_id
            WHERE s.meal_plan_id = $1
            ",
        )
        .bind(self.meal_plan_id)
        .fetch_all(pool)
        .await?;

        Ok(slots)
    }

    pub async fn week(&self, pool: &PgPool) -> Result<WeekGrid> {
        Ok(WeekGrid::new(self.slots(pool).await?))
    }

    /// Puts `recipe_id` in the slot, replacing whatever was planned there.
    #[tracing::instrument(err, skip(self, pool, notes), fields(meal_plan_id = %self.meal_plan_id))]
    pub async fn assign(
        &self,
        pool: &PgPool,
        day: Day,
        meal: SlotMeal,
        recipe_id: Uuid,
        notes: Option<String>,
    ) -> Result<MealSlot> {
        let slot = sqlx::query_as::<_, MealSlot>(
            "
            WITH s AS (
                INSERT INTO meal_slots (meal_plan_id, day, meal_type, recipe_id, notes)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (meal_plan_id, day, meal_type) DO UPDATE
                SET recipe_id = EXCLUDED.recipe_id,
                    notes = EXCLUDED.notes,
                    updated_at = NOW()
                RETURNING *
            )
            SELECT
                s.meal_slot_id,
                s.meal_plan_id,
                s.day,
                s.meal_type,
                s.recipe_id,
                r.title AS recipe_title,
                s.notes,
                s.updated_at
            FROM s
            JOIN recipes r ON r.recipe_id = s.recipe_id
            ",
        )
        .bind(self.meal_plan_id)
        .bind(day)
        .bind(meal)
        .bind(recipe_id)
        .bind(notes)
        .fetch_one(pool)
        .await?;

        Ok(slot)
    }

    #[tracing::instrument(err, skip(self, pool), fields(meal_plan_id = %self.meal_plan_id))]
    pub async fn clear(&self, pool: &PgPool, day: Day, meal: SlotMeal) -> Result<bool> {
        let result = sqlx::query(
            "
            DELETE FROM meal_slots
            WHERE meal_plan_id = $1 AND day = $2 AND meal_type = $3
            ",
        )
        .bind(self.meal_plan_id)
        .bind(day)
        .bind(meal)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// A week of slots addressable by day and meal.
#[derive(Debug, Clone, Default)]
pub struct WeekGrid {
    slots: HashMap<(Day, SlotMeal), MealSlot>,
}

impl WeekGrid {
    pub fn new(slots: impl IntoIterator<Item = MealSlot>) -> Self {
        Self {
            slots: slots
                .into_iter()
                .map(|slot| ((slot.day, slot.meal_type), slot))
                .collect(),
        }
    }

    pub fn get(&self, day: Day, meal: SlotMeal) -> Option<&MealSlot> {
        self.slots.get(&(day, meal))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooking::recipe::{tests::fields, Recipe};
    use crate::users::User;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-06-05 is a Wednesday
        assert_eq!(week_start_for(date(2024, 6, 5)), date(2024, 6, 3));
        assert_eq!(week_start_for(date(2024, 6, 3)), date(2024, 6, 3));
        assert_eq!(week_start_for(date(2024, 6, 9)), date(2024, 6, 3));
    }

    #[test]
    fn days_parse_loosely() {
        assert_eq!("Monday".parse::<Day>(), Ok(Day::Monday));
        assert_eq!("sat".parse::<Day>(), Ok(Day::Saturday));
        assert_eq!(" SUNDAY ".parse::<Day>(), Ok(Day::Sunday));
        assert!("someday".parse::<Day>().is_err());
        assert_eq!("Elevenses".parse::<SlotMeal>(), Ok(SlotMeal::Elevenses));
    }

    #[test]
    fn days_map_to_dates() {
        let monday = date(2024, 6, 3);

        assert_eq!(Day::Sunday.date_in_week(monday), date(2024, 6, 9));
        assert_eq!(Day::from_weekday(Weekday::Thu), Day::Thursday);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn plans_are_unique_per_week(pool: PgPool) {
        let user = User::get_or_create_by_username(&pool, "planner").await.unwrap();

        let plan = MealPlan::get_or_create(&pool, user.user_id, date(2024, 6, 5))
            .await
            .unwrap();
        let again = MealPlan::get_or_create(&pool, user.user_id, date(2024, 6, 3))
            .await
            .unwrap();

        assert_eq!(plan.meal_plan_id, again.meal_plan_id);
        assert_eq!(plan.week_start, date(2024, 6, 3));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn assigning_replaces_the_slot(pool: PgPool) {
        let user = User::get_or_create_by_username(&pool, "planner").await.unwrap();
        let porridge = Recipe::create(&pool, user.user_id, &fields("Porridge"))
            .await
            .unwrap();
        let waffles = Recipe::create(&pool, user.user_id, &fields("Waffles"))
            .await
            .unwrap();
        let plan = MealPlan::get_or_create(&pool, user.user_id, date(2024, 6, 3))
            .await
            .unwrap();

        plan.assign(&pool, Day::Tuesday, SlotMeal::Breakfast, porridge.recipe_id, None)
            .await
            .unwrap();
        let slot = plan
            .assign(
                &pool,
                Day::Tuesday,
                SlotMeal::Breakfast,
                waffles.recipe_id,
                Some("with berries".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(slot.recipe_title, "Waffles");

        let week = plan.week(&pool).await.unwrap();
        assert_eq!(week.len(), 1);
        let tuesday = week.get(Day::Tuesday, SlotMeal::Breakfast).unwrap();
        assert_eq!(tuesday.recipe_id, waffles.recipe_id);
        assert_eq!(tuesday.notes.as_deref(), Some("with berries"));
        assert!(week.get(Day::Tuesday, SlotMeal::Lunch).is_none());

        assert!(plan.clear(&pool, Day::Tuesday, SlotMeal::Breakfast).await.unwrap());
        assert!(plan.week(&pool).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_a_recipe_clears_its_slots(pool: PgPool) {
        let user = User::get_or_create_by_username(&pool, "planner").await.unwrap();
        let stew = Recipe::create(&pool, user.user_id, &fields("Stew"))
            .await
            .unwrap();
        let plan = MealPlan::get_or_create(&pool, user.user_id, date(2024, 6, 3))
            .await
            .unwrap();
        plan.assign(&pool, Day::Friday, SlotMeal::Dinner, stew.recipe_id, None)
            .await
            .unwrap();

        Recipe::delete(&pool, stew.recipe_id).await.unwrap();

        assert!(plan.slots(&pool).await.unwrap().is_empty());
    }
}
