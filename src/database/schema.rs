use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TypeError;
use crate::constants::MEDIA_URL;

pub type Uuid = i32;

#[derive(
    Clone, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Eq, Ord, Hash, Deserialize,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}

/// Boolean-like query flag: accepts the literal values "1" and "0" only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Set,
    Unset,
}

impl TryFrom<&str> for Flag {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "1" => Ok(Self::Set),
            "0" => Ok(Self::Unset),
            _ => Err(TypeError::new("Invalid flag value, expected \"1\" or \"0\"")),
        }
    }
}

impl Flag {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set)
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,

    pub count: i64,
}

impl UserRow {
    pub fn profile(&self, is_subscribed: bool) -> UserProfile {
        UserProfile {
            email: self.email.to_owned(),
            id: self.id,
            username: self.username.to_owned(),
            first_name: self.first_name.to_owned(),
            last_name: self.last_name.to_owned(),
            is_subscribed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserProfile {
    pub fn new(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.to_owned(),
            id: user.id,
            username: user.username.to_owned(),
            first_name: user.first_name.to_owned(),
            last_name: user.last_name.to_owned(),
            is_subscribed,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

impl Recipe {
    pub fn image_url(&self) -> Option<String> {
        self.image
            .as_ref()
            .map(|path| format!("{MEDIA_URL}/{path}"))
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,

    pub count: i64,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            name: row.name,
            text: row.text,
            image: row.image,
            cooking_time: row.cooking_time,
            pub_date: row.pub_date,
        }
    }
}

/// One ingredient line of a recipe, joined with the catalog entry.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeIngredientRow {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeMinified {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeMinified {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            image: recipe.image_url(),
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientRow>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolloweeView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub recipes: Vec<RecipeMinified>,
    pub recipes_count: i64,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct ShoplistRow {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeIngredientPayload {
    pub id: Uuid,
    pub amount: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipePayload {
    pub name: String,
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: i32,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<RecipeIngredientPayload>,
}

impl RecipePayload {
    /// Validates everything that does not require a database roundtrip.
    /// Referenced tags are checked against the catalog on write.
    pub fn validate(&self) -> Result<(), TypeError> {
        let mut seen: Vec<Uuid> = vec![];
        for ingredient in self.ingredients.iter() {
            if seen.contains(&ingredient.id) {
                return Err(TypeError::new("Duplicate ingredient in recipe"));
            }
            seen.push(ingredient.id);

            if ingredient.amount <= 0 {
                return Err(TypeError::new("Ingredient amount must be positive"));
            }
        }

        if self.cooking_time <= 0 {
            return Err(TypeError::new("Cooking time must be positive"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagPayload {
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientPayload {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionQuery {
    pub recipes_limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Parsed query parameters for recipe listing. Built from the raw
/// key/value pairs so that repeated `tags` keys keep OR semantics.
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    pub tags: Vec<String>,
    pub author: Option<Uuid>,
    pub is_favorited: Option<Flag>,
    pub is_in_shopping_cart: Option<Flag>,
    pub offset: i64,
}

impl RecipeListQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, TypeError> {
        let mut query = Self::default();

        for (key, value) in pairs.iter() {
            match key.as_str() {
                "tags" => query.tags.push(value.to_owned()),
                "author" => {
                    let id = value
                        .parse::<Uuid>()
                        .map_err(|_| TypeError::new("Invalid author id"))?;
                    query.author = Some(id);
                }
                "is_favorited" => {
                    query.is_favorited = Some(Flag::try_from(value.as_str())?);
                }
                "is_in_shopping_cart" => {
                    query.is_in_shopping_cart = Some(Flag::try_from(value.as_str())?);
                }
                "offset" => {
                    let offset = value
                        .parse::<i64>()
                        .map_err(|_| TypeError::new("Invalid offset"))?;
                    query.offset = offset.max(0);
                }
                _ => {}
            }
        }

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn flag_accepts_literal_one_and_zero_only() {
        assert_eq!(Flag::try_from("1").unwrap(), Flag::Set);
        assert_eq!(Flag::try_from("0").unwrap(), Flag::Unset);
        assert!(Flag::try_from("7").is_err());
        assert!(Flag::try_from("true").is_err());
        assert!(Flag::try_from("").is_err());
    }

    #[test]
    fn recipe_query_collects_repeated_tags() {
        let query =
            RecipeListQuery::from_pairs(&pairs(&[("tags", "breakfast"), ("tags", "lunch")]))
                .unwrap();
        assert_eq!(query.tags, vec!["breakfast", "lunch"]);
        assert!(query.author.is_none());
    }

    #[test]
    fn recipe_query_rejects_invalid_flag() {
        assert!(RecipeListQuery::from_pairs(&pairs(&[("is_favorited", "7")])).is_err());
        assert!(RecipeListQuery::from_pairs(&pairs(&[("is_in_shopping_cart", "yes")])).is_err());
    }

    #[test]
    fn recipe_query_parses_author_and_offset() {
        let query = RecipeListQuery::from_pairs(&pairs(&[
            ("author", "3"),
            ("offset", "20"),
            ("is_favorited", "1"),
        ]))
        .unwrap();
        assert_eq!(query.author, Some(3));
        assert_eq!(query.offset, 20);
        assert_eq!(query.is_favorited, Some(Flag::Set));
    }

    #[test]
    fn recipe_payload_rejects_duplicate_ingredients() {
        let payload = RecipePayload {
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            image: None,
            cooking_time: 20,
            tags: vec![1],
            ingredients: vec![
                RecipeIngredientPayload { id: 1, amount: 200 },
                RecipeIngredientPayload { id: 1, amount: 300 },
            ],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn recipe_payload_rejects_non_positive_amounts() {
        let payload = RecipePayload {
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            image: None,
            cooking_time: 20,
            tags: vec![],
            ingredients: vec![RecipeIngredientPayload { id: 1, amount: 0 }],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn recipe_payload_rejects_non_positive_cooking_time() {
        let payload = RecipePayload {
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            image: None,
            cooking_time: 0,
            tags: vec![],
            ingredients: vec![RecipeIngredientPayload { id: 1, amount: 10 }],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn recipe_payload_accepts_valid_input() {
        let payload = RecipePayload {
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            image: None,
            cooking_time: 20,
            tags: vec![1, 2],
            ingredients: vec![
                RecipeIngredientPayload { id: 1, amount: 200 },
                RecipeIngredientPayload { id: 2, amount: 2 },
            ],
        };
        assert!(payload.validate().is_ok());
    }
}
