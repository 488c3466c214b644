use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub role: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StreamInfo {
    pub stream_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Comment {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub comment: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: NaiveDateTime,
}

/// Identity used to drop a comment delivered twice, e.g. by the live feed and by a reload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommentKey {
    Id(String),
    Content {
        username: Option<String>,
        comment: String,
        created_at: NaiveDateTime,
    },
}

impl Comment {
    pub fn key(&self) -> CommentKey {
        match &self.id {
            Some(id) => CommentKey::Id(id.clone()),
            None => CommentKey::Content {
                username: self.username.clone(),
                comment: self.comment.clone(),
                created_at: self.created_at,
            },
        }
    }

    pub fn author(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Anonymous")
    }
}

#[derive(Serialize)]
pub struct NewComment<'a> {
    pub comment: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WeatherReport {
    pub city: Option<String>,
    pub country: Option<String>,
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    pub message: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ChatExchange {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub response: String,
    pub created_at: Option<String>,
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let id = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match id {
        Some(serde_json::Value::String(id)) => Some(id),
        Some(serde_json::Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;

    raw.parse::<NaiveDateTime>()
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|date| date.naive_utc()))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_from_backend() {
        let comment: Comment = serde_json::from_str(
            r#"{"username": "alice", "comment": "Bonjour", "created_at": "2024-05-01T10:00:00.123456"}"#,
        )
        .unwrap();

        assert_eq!(comment.id, None);
        assert_eq!(comment.author(), "alice");
        assert_eq!(comment.created_at.to_string(), "2024-05-01 10:00:00.123456");
    }

    #[test]
    fn test_comment_numeric_id_and_offset_timestamp() {
        let comment: Comment = serde_json::from_str(
            r#"{"id": 42, "username": null, "comment": "Hi", "created_at": "2024-05-01T12:00:00+02:00"}"#,
        )
        .unwrap();

        assert_eq!(comment.key(), CommentKey::Id("42".to_string()));
        assert_eq!(comment.author(), "Anonymous");
        assert_eq!(comment.created_at.to_string(), "2024-05-01 10:00:00");
    }

    #[test]
    fn test_comment_key_without_id() {
        let parse = |json: &str| serde_json::from_str::<Comment>(json).unwrap();

        let first = parse(r#"{"username": "bob", "comment": "Hi", "created_at": "2024-05-01T10:00:00"}"#);
        let same = parse(r#"{"username": "bob", "comment": "Hi", "created_at": "2024-05-01T10:00:00"}"#);
        let later = parse(r#"{"username": "bob", "comment": "Hi", "created_at": "2024-05-01T10:00:01"}"#);

        assert_eq!(first.key(), same.key());
        assert_ne!(first.key(), later.key());
    }

    #[test]
    fn test_weather_report_tolerates_missing_fields() {
        let report: WeatherReport =
            serde_json::from_str(r#"{"city": "Paris", "temperature": 21.5}"#).unwrap();

        assert_eq!(report.city.as_deref(), Some("Paris"));
        assert_eq!(report.temperature, Some(21.5));
        assert_eq!(report.error, None);
    }

    #[test]
    fn test_chat_history_entry() {
        let history: Vec<ChatExchange> = serde_json::from_str(
            r#"[{"message": "hello", "response": "Hi there", "created_at": "2024-05-01T10:00:00"}]"#,
        )
        .unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].response, "Hi there");
    }
}
