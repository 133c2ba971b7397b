use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, ValidationErrors, REQUIRED};
use crate::models::price::{Price, PriceInput};
use crate::models::recipe::Recipe;
use crate::models::tag::Tag;
use crate::routes::tag::tag_models::TagPayload;

const DESCRIPTION_MAX_LENGTH: usize = 4000;
const INVALID_INTEGER: &str = "A valid integer is required.";

/// Raw integer as it arrives in a request body: `30`, `30.0` or `"30"`.
/// Anything else is kept so it can be reported against its field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntegerInput {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl IntegerInput {
    /// Accepts whole numbers within the 32-bit column range.
    pub fn parse(&self) -> Result<i64, String> {
        let value = match self {
            IntegerInput::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(v), _) => Some(v),
                (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e18 => Some(f as i64),
                _ => None,
            },
            IntegerInput::Text(raw) => {
                let raw = raw.trim();
                let whole = match raw.split_once('.') {
                    Some((whole, zeros)) if zeros.bytes().all(|b| b == b'0') => whole,
                    _ => raw,
                };
                whole.parse().ok()
            }
            IntegerInput::Other(_) => None,
        };

        match value {
            None => Err(INVALID_INTEGER.to_string()),
            Some(v) if v > i64::from(i32::MAX) => Err(format!(
                "Ensure this value is less than or equal to {}.",
                i32::MAX
            )),
            Some(v) if v < i64::from(i32::MIN) => Err(format!(
                "Ensure this value is greater than or equal to {}.",
                i32::MIN
            )),
            Some(v) => Ok(v),
        }
    }
}

// Recipe create / update request
#[derive(Debug, Default, Deserialize)]
pub struct RecipePayload {
    pub title: Option<String>,
    pub time_minutes: Option<IntegerInput>,
    pub price: Option<PriceInput>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<TagPayload>>,
}

/// Checked recipe fields; `None` leaves the stored value as it is.
#[derive(Debug, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl RecipePayload {
    /// Create and full update require title, time and price; a partial
    /// update requires nothing.
    pub fn validate(self, partial: bool) -> Result<RecipeChanges, ApiError> {
        let mut errors = ValidationErrors::default();
        let required = !partial;

        errors.check_name("title", self.title.as_deref(), required);

        let time_minutes = match &self.time_minutes {
            Some(input) => match input.parse() {
                Ok(minutes) => Some(minutes),
                Err(message) => {
                    errors.add("time_minutes", &message);
                    None
                }
            },
            None => {
                if required {
                    errors.add("time_minutes", REQUIRED);
                }
                None
            }
        };

        let link = self.link.map(|l| l.trim().to_string());
        if let Some(link) = link.as_deref() {
            errors.check_length("link", link);
        }
        let description = self.description.map(|d| d.trim().to_string());
        if let Some(description) = description.as_deref() {
            errors.check_max_length("description", description, DESCRIPTION_MAX_LENGTH);
        }

        let price = match &self.price {
            Some(input) => match input.parse() {
                Ok(price) => Some(price),
                Err(e) => {
                    errors.add("price", &e.to_string());
                    None
                }
            },
            None => {
                if required {
                    errors.add("price", REQUIRED);
                }
                None
            }
        };

        let tags = self.tags.map(|tags| {
            let mut names: Vec<String> = Vec::with_capacity(tags.len());
            for tag in tags {
                match tag.validate(false) {
                    Ok(Some(name)) => {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                    Ok(None) => errors.add("tags", REQUIRED),
                    Err(ApiError::Validation(fields)) => {
                        for message in fields.into_values().flatten() {
                            errors.add("tags", &format!("name: {}", message));
                        }
                    }
                    Err(e) => errors.add("tags", &e.to_string()),
                }
            }
            names
        });

        errors.into_result()?;
        Ok(RecipeChanges {
            title: self.title.map(|t| t.trim().to_string()),
            time_minutes,
            price,
            link,
            description,
            tags,
        })
    }
}

impl RecipeChanges {
    /// Writes the scalar fields onto `recipe` and hands back the tag names, if any.
    pub fn apply(self, recipe: &mut Recipe) -> Option<Vec<String>> {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price_cents = price.cents();
        }
        if let Some(link) = self.link {
            recipe.link = link;
        }
        if let Some(description) = self.description {
            recipe.description = description;
        }
        self.tags
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    pub tags: Option<String>,
}

impl RecipeQuery {
    /// Parses `?tags=1,2` into ids. Empty segments are skipped.
    pub fn tag_ids(&self) -> Result<Vec<i64>, ApiError> {
        let Some(raw) = self.tags.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().map_err(|_| ApiError::field("tags", "Enter a whole number.")))
            .collect()
    }
}

/// List representation of a recipe.
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub time_minutes: i64,
    pub price: Price,
    pub link: String,
    pub tags: Vec<Tag>,
}

/// Detail representation: the summary plus the description.
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub description: String,
}

impl RecipeSummary {
    pub fn new(recipe: &Recipe, tags: Vec<Tag>) -> Self {
        RecipeSummary {
            id: recipe.id,
            title: recipe.title.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price(),
            link: recipe.link.clone(),
            tags,
        }
    }
}

impl RecipeDetail {
    pub fn new(recipe: Recipe, tags: Vec<Tag>) -> Self {
        RecipeDetail {
            summary: RecipeSummary::new(&recipe, tags),
            description: recipe.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> RecipePayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_requires_core_fields() {
        match RecipePayload::default().validate(false) {
            Err(ApiError::Validation(map)) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                assert_eq!(keys, ["price", "time_minutes", "title"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn partial_update_accepts_empty_payload() {
        let changes = RecipePayload::default().validate(true).unwrap();
        assert!(changes.title.is_none());
        assert!(changes.tags.is_none());
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let changes = payload(json!({
            "title": "Curry",
            "time_minutes": 30,
            "price": "7.00",
            "tags": [{"name": "Indian"}, {"name": " Indian "}, {"name": "Dinner"}],
        }))
        .validate(false)
        .unwrap();

        assert_eq!(changes.tags.unwrap(), ["Indian", "Dinner"]);
        assert_eq!(changes.price, Some(Price::from_cents(700)));
    }

    #[test]
    fn bad_price_and_blank_tag_are_reported() {
        match payload(json!({
            "title": "Curry",
            "time_minutes": 30,
            "price": "7.123",
            "tags": [{"name": ""}],
        }))
        .validate(false)
        {
            Err(ApiError::Validation(map)) => {
                assert_eq!(
                    map["price"],
                    vec!["Ensure that there are no more than 2 decimal places.".to_string()]
                );
                assert_eq!(map["tags"], vec!["name: This field may not be blank.".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn time_accepts_numeric_strings_and_reports_bad_values() {
        let changes = payload(json!({"title": "Stew", "time_minutes": "45", "price": 3}))
            .validate(false)
            .unwrap();
        assert_eq!(changes.time_minutes, Some(45));

        let changes = payload(json!({"time_minutes": 20.0})).validate(true).unwrap();
        assert_eq!(changes.time_minutes, Some(20));

        for bad in [json!("abc"), json!(2.5), json!(true), json!([1])] {
            match payload(json!({"time_minutes": bad.clone()})).validate(true) {
                Err(ApiError::Validation(map)) => {
                    assert_eq!(map["time_minutes"], vec![INVALID_INTEGER.to_string()])
                }
                other => panic!("unexpected result for {}: {:?}", bad, other),
            }
        }

        match payload(json!({"time_minutes": 3_000_000_000i64})).validate(true) {
            Err(ApiError::Validation(map)) => assert_eq!(
                map["time_minutes"],
                vec!["Ensure this value is less than or equal to 2147483647.".to_string()]
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn text_fields_are_trimmed_and_description_is_bounded() {
        let changes = payload(json!({"link": " https://example.com/r ", "description": "  Simmer.\n"}))
            .validate(true)
            .unwrap();
        assert_eq!(changes.link.as_deref(), Some("https://example.com/r"));
        assert_eq!(changes.description.as_deref(), Some("Simmer."));

        match payload(json!({"description": "x".repeat(4001)})).validate(true) {
            Err(ApiError::Validation(map)) => assert_eq!(
                map["description"],
                vec!["Ensure this field has no more than 4000 characters.".to_string()]
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn apply_overwrites_only_given_fields() {
        let mut recipe = Recipe {
            title: "Old".into(),
            description: "Keep me".into(),
            time_minutes: 5,
            price_cents: 100,
            ..Recipe::new(1)
        };
        let tags = payload(json!({"title": "New", "price": 2.5}))
            .validate(true)
            .unwrap()
            .apply(&mut recipe);

        assert!(tags.is_none());
        assert_eq!(recipe.title, "New");
        assert_eq!(recipe.price_cents, 250);
        assert_eq!(recipe.description, "Keep me");
        assert_eq!(recipe.time_minutes, 5);
    }

    #[test]
    fn tag_filter_parsing() {
        let query = RecipeQuery { tags: Some("1, 2,,3".into()) };
        assert_eq!(query.tag_ids().unwrap(), vec![1, 2, 3]);
        assert!(RecipeQuery::default().tag_ids().unwrap().is_empty());
        assert!(RecipeQuery { tags: Some("1,x".into()) }.tag_ids().is_err());
    }

    #[test]
    fn detail_includes_description_but_summary_does_not() {
        let recipe = Recipe {
            id: 4,
            title: "Toast".into(),
            description: "Bread, heated.".into(),
            time_minutes: 3,
            price_cents: 150,
            ..Recipe::new(1)
        };
        let summary = serde_json::to_value(RecipeSummary::new(&recipe, vec![])).unwrap();
        assert!(summary.get("description").is_none());
        assert_eq!(summary["price"], "1.50");

        let detail = serde_json::to_value(RecipeDetail::new(recipe, vec![])).unwrap();
        assert_eq!(detail["description"], "Bread, heated.");
        assert_eq!(detail["id"], 4);
    }
}
