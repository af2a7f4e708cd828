use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend rows may carry `null` for text columns; treat it as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Article
// ============================================================================

/// A single encyclopedia article summary.
///
/// `id` is the source's page id rendered as a string. It is stable across
/// fetches of the same page, so it doubles as the key for liked/saved
/// membership. The browse feed may hold the same id more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extract: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<String>,
}

impl Article {
    /// Text shown in the saved library: summary first, extract as fallback.
    pub fn display_text(&self) -> &str {
        if self.summary.is_empty() {
            &self.extract
        } else {
            &self.summary
        }
    }

    /// `viewed_at` parsed as a UTC timestamp.
    ///
    /// The backend emits naive ISO-8601 timestamps (no offset), which are
    /// interpreted as UTC. Returns `None` when absent or unparseable.
    pub fn viewed_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.viewed_at.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

// ============================================================================
// Session / User
// ============================================================================

/// The signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Name for the header: username, then email, then a generic label.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Signed in")
    }
}

/// Interaction counters for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserStats {
    pub total_viewed: u64,
    pub total_liked: u64,
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            id: "1".to_string(),
            title: "Title".to_string(),
            summary: "Summary".to_string(),
            thumbnail: None,
            url: "https://en.wikipedia.org/wiki/Title".to_string(),
            extract: "Extract".to_string(),
            viewed_at: None,
        }
    }

    #[test]
    fn test_display_text_prefers_summary() {
        let mut a = article();
        assert_eq!(a.display_text(), "Summary");
        a.summary.clear();
        assert_eq!(a.display_text(), "Extract");
    }

    #[test]
    fn test_absent_thumbnail_not_serialized() {
        let json = serde_json::to_value(article()).unwrap();
        assert!(json.get("thumbnail").is_none());
        assert!(json.get("viewed_at").is_none());
    }

    #[test]
    fn test_backend_article_with_null_thumbnail() {
        let raw = r#"{"id":"42","title":"T","summary":"S","url":"u","thumbnail":null,"extract":"S"}"#;
        let a: Article = serde_json::from_str(raw).unwrap();
        assert_eq!(a.thumbnail, None);
        assert_eq!(a.id, "42");
    }

    #[test]
    fn test_backend_article_with_null_summary() {
        let raw = r#"{"id":"7","title":"T","summary":null,"url":"u","extract":null}"#;
        let a: Article = serde_json::from_str(raw).unwrap();
        assert!(a.summary.is_empty());
        assert!(a.extract.is_empty());
    }

    #[test]
    fn test_viewed_at_naive_timestamp() {
        let mut a = article();
        a.viewed_at = Some("2024-03-01T12:30:00.123456".to_string());
        let dt = a.viewed_at_utc().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-03-01 12:30");
    }

    #[test]
    fn test_viewed_at_garbage_is_none() {
        let mut a = article();
        a.viewed_at = Some("yesterday".to_string());
        assert!(a.viewed_at_utc().is_none());
    }

    #[test]
    fn test_user_display_name_fallback() {
        let user = User {
            id: 1,
            email: Some("a@example.com".to_string()),
            username: None,
            created_at: None,
        };
        assert_eq!(user.display_name(), "a@example.com");

        let named = User {
            username: Some("alice".to_string()),
            ..user
        };
        assert_eq!(named.display_name(), "alice");
    }
}
