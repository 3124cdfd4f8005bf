use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Record collections exposed under `tables/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    LearningPathways,
    LaborMarketData,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::LearningPathways => "learning_pathways",
            Collection::LaborMarketData => "labor_market_data",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a list response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

/// Unrecognised paces are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LearningPace {
    #[default]
    SelfPaced,
    Structured,
    Intensive,
    Other(String),
}

impl LearningPace {
    pub fn as_str(&self) -> &str {
        match self {
            LearningPace::SelfPaced => "self_paced",
            LearningPace::Structured => "structured",
            LearningPace::Intensive => "intensive",
            LearningPace::Other(raw) => raw,
        }
    }
}

impl From<String> for LearningPace {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "self_paced" => LearningPace::SelfPaced,
            "structured" => LearningPace::Structured,
            "intensive" => LearningPace::Intensive,
            _ => LearningPace::Other(raw),
        }
    }
}

impl From<LearningPace> for String {
    fn from(pace: LearningPace) -> Self {
        match pace {
            LearningPace::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Reads an age the way a form value is read: leading whitespace, then the
/// leading run of digits. "22.5" and "22 yrs" give 22; "abc" and "-3" give
/// nothing.
pub fn parse_age(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let digits = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();
    digits.parse().ok()
}

/// Field decoders for rows the record API hands back. Rows can carry nulls or
/// loosely typed values; none of them should make a row unreadable.
mod lenient {
    use super::*;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn age<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
                .and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => parse_age(&s),
            _ => None,
        })
    }

    pub fn pace<'de, D: Deserializer<'de>>(d: D) -> Result<LearningPace, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => LearningPace::from(s),
            _ => LearningPace::default(),
        })
    }
}

/// User record in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,           // server-assigned
    #[serde(deserialize_with = "lenient::string")]
    pub email: String,                // unique, case-sensitive
    #[serde(default, deserialize_with = "lenient::string")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::age")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub education_level: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub profile_pic: Option<String>,  // data URI
    #[serde(default, deserialize_with = "lenient::strings")]
    pub current_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub career_aspiration: String,
    #[serde(default, deserialize_with = "lenient::pace")]
    pub learning_pace: LearningPace,
    #[serde(default, deserialize_with = "lenient::string")]
    pub socio_economic_context: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ai_mentor_preferences: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,           // RFC 3339
    /// Whatever else the server attached to the record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    pub fn first_name(&self) -> &str {
        self.full_name.split(' ').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPathway {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub nsqf_level: Option<u8>,
    #[serde(default)]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub industry_sector: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills_covered: Vec<String>,
    #[serde(default)]
    pub market_demand: String,
    #[serde(default)]
    pub salary_range: String,
    #[serde(default)]
    pub job_roles: Vec<String>,
    #[serde(default)]
    pub ai_recommendation_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_record_keeps_server_fields() {
        let raw = json!({
            "id": "u-1",
            "email": "asha@example.com",
            "full_name": "Asha Rao",
            "age": 22,
            "learning_pace": "self_paced",
            "gs_project_id": "p-9",
            "updated_at": 1700000000
        });
        let user: UserRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id.as_deref(), Some("u-1"));
        assert_eq!(user.first_name(), "Asha");
        assert!(user.current_skills.is_empty());
        assert_eq!(user.extra.get("gs_project_id"), Some(&json!("p-9")));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["updated_at"], json!(1700000000));
    }

    #[test]
    fn new_user_serializes_without_id() {
        let user: UserRecord = serde_json::from_value(json!({ "email": "a@b.co" })).unwrap();
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["learning_pace"], json!("self_paced"));
        assert_eq!(value["profile_pic"], Value::Null);
    }

    #[test]
    fn loosely_typed_rows_still_read() {
        let raw = json!({
            "id": 9,
            "email": "ravi@example.com",
            "full_name": null,
            "age": "19",
            "learning_pace": "weekend",
            "current_skills": null,
            "created_at": null
        });
        let user: UserRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id.as_deref(), Some("9"));
        assert_eq!(user.full_name, "");
        assert_eq!(user.first_name(), "");
        assert_eq!(user.age, Some(19));
        assert_eq!(user.learning_pace, LearningPace::Other("weekend".into()));
        assert!(user.current_skills.is_empty());

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["learning_pace"], json!("weekend"));
    }

    #[test]
    fn out_of_range_ages_read_as_unknown() {
        for age in [json!(-4), json!("abc"), json!(true), json!(5_000_000_000u64)] {
            let user: UserRecord =
                serde_json::from_value(json!({ "email": "a@b.co", "age": age.clone() })).unwrap();
            assert_eq!(user.age, None, "{age}");
        }
        let user: UserRecord =
            serde_json::from_value(json!({ "email": "a@b.co", "age": 22.0 })).unwrap();
        assert_eq!(user.age, Some(22));
    }

    #[test]
    fn age_takes_the_leading_digits() {
        assert_eq!(parse_age("22"), Some(22));
        assert_eq!(parse_age("  22.5"), Some(22));
        assert_eq!(parse_age("22 yrs"), Some(22));
        assert_eq!(parse_age("+18"), Some(18));
        assert_eq!(parse_age("nineteen"), None);
        assert_eq!(parse_age("-3"), None);
        assert_eq!(parse_age(""), None);
    }

    #[test]
    fn collection_paths() {
        assert_eq!(Collection::Users.to_string(), "users");
        assert_eq!(Collection::LearningPathways.as_str(), "learning_pathways");
        assert_eq!(Collection::LaborMarketData.as_str(), "labor_market_data");
    }
}
