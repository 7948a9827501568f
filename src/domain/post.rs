use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub type PostId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    /// Nothing enforces the author reference; a null one renders as the
    /// placeholder author.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    /// Storage path of the attached image, e.g. `posts/posts/<file>.jpg`.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
}

/// Insert payload for the `posts` table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub body: String,
    pub user_id: Uuid,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `createdAt` is written as RFC 3339 but a `timestamp` column without a
/// zone reads back without an offset; those values are taken as UTC.
mod timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::{Iso8601, Rfc3339};
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time::serde::rfc3339::serialize(value, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<OffsetDateTime, String> {
        if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Ok(value);
        }
        if let Ok(value) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
            return Ok(value);
        }
        PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
            .map(PrimitiveDateTime::assume_utc)
            .map_err(|err| format!("invalid createdAt {:?}: {}", raw, err))
    }
}
