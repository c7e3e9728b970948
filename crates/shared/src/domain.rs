use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(RecipeId);
id_newtype!(PlannedMealId);
id_newtype!(ShoppingItemId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Local,
    Apple,
    Google,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub provider: AuthProvider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f32,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: RecipeId,
    pub title: String,
    pub servings: u32,
    pub prep_minutes: u32,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// Slots are declared in the order they appear during a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub meal_id: PlannedMealId,
    pub recipe_id: RecipeId,
    pub date: NaiveDate,
    pub slot: MealSlot,
}

/// Deserialization rebuilds the plan through `new` and `add_meal`, so a seed
/// file cannot carry an inverted range or a meal outside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMealPlan")]
pub struct MealPlan {
    start_date: NaiveDate,
    end_date: NaiveDate,
    meals: Vec<PlannedMeal>,
}

#[derive(Deserialize)]
struct RawMealPlan {
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    meals: Vec<PlannedMeal>,
}

impl TryFrom<RawMealPlan> for MealPlan {
    type Error = AppError;

    fn try_from(raw: RawMealPlan) -> Result<Self, Self::Error> {
        let mut plan = MealPlan::new(raw.start_date, raw.end_date)?;
        for meal in raw.meals {
            plan.add_meal(meal)?;
        }
        Ok(plan)
    }
}

impl MealPlan {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, AppError> {
        if end_date < start_date {
            return Err(AppError::validation(format!(
                "invalid meal plan range: end {end_date} precedes start {start_date}"
            )));
        }
        Ok(Self {
            start_date,
            end_date,
            meals: Vec::new(),
        })
    }

    /// Seven-day plan beginning on `start_date`.
    pub fn week_starting(start_date: NaiveDate) -> Self {
        let end_date = start_date
            .checked_add_days(Days::new(6))
            .unwrap_or(start_date);
        Self {
            start_date,
            end_date,
            meals: Vec::new(),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn meals(&self) -> &[PlannedMeal] {
        &self.meals
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn add_meal(&mut self, meal: PlannedMeal) -> Result<(), AppError> {
        if !self.contains_date(meal.date) {
            return Err(AppError::validation(format!(
                "invalid meal date {}: plan covers {} to {}",
                meal.date, self.start_date, self.end_date
            )));
        }
        self.meals.push(meal);
        Ok(())
    }

    pub fn remove_meal(&mut self, meal_id: PlannedMealId) -> Option<PlannedMeal> {
        let index = self.meals.iter().position(|meal| meal.meal_id == meal_id)?;
        Some(self.meals.remove(index))
    }

    /// Meals scheduled on `date`, breakfast first. Meals sharing a slot keep insertion order.
    pub fn meals_on(&self, date: NaiveDate) -> Vec<&PlannedMeal> {
        let mut meals: Vec<&PlannedMeal> =
            self.meals.iter().filter(|meal| meal.date == date).collect();
        meals.sort_by_key(|meal| meal.slot);
        meals
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub item_id: ShoppingItemId,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCart {
    items: Vec<ShoppingItem>,
}

impl ShoppingCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over the current contents.
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Adds `item`, folding its quantity into an existing entry with the same name.
    /// Returns the id of the entry that now holds the quantity.
    pub fn add_item(&mut self, item: ShoppingItem) -> ShoppingItemId {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|existing| existing.name.eq_ignore_ascii_case(&item.name))
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            return existing.item_id;
        }
        let item_id = item.item_id;
        self.items.push(item);
        item_id
    }

    pub fn remove_item(&mut self, item_id: ShoppingItemId) -> Option<ShoppingItem> {
        let index = self.items.iter().position(|item| item.item_id == item_id)?;
        Some(self.items.remove(index))
    }

    /// Setting a quantity of zero removes the item. Returns false for unknown ids.
    pub fn set_quantity(&mut self, item_id: ShoppingItemId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_item(item_id).is_some();
        }
        match self.items.iter_mut().find(|item| item.item_id == item_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn toggle_checked(&mut self, item_id: ShoppingItemId) -> bool {
        match self.items.iter_mut().find(|item| item.item_id == item_id) {
            Some(item) => {
                item.checked = !item.checked;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Recipes,
    #[default]
    MealPlanner,
    ShoppingList,
    Profile,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
