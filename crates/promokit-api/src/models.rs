// Wire types for the code source and redemption sink.
//
// These mirror the JSON exactly as the collaborators send it. The code
// source is typically spreadsheet-backed, so scalar fields may arrive as
// strings, numbers, or null; `lenient_string` folds all of them to text
// and `lenient_opt_string` does the same for optional cells.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Marker the code source uses in `source` when it is reporting a failure.
pub const SOURCE_ERROR_MARKER: &str = "error";

/// One promo code record, as listed by the code source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub bonus_item: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub customer: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default)]
    pub redemption_date: Option<String>,
}

/// Raw read response. Covers both the success shape
/// `{ codes, source }` and the error shape
/// `{ error: true, message, details, source: "error" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct CodesEnvelope {
    #[serde(default)]
    pub codes: Option<Vec<CodeRecord>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// A successful read: the full code list plus the source's own label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodesPage {
    pub codes: Vec<CodeRecord>,
    pub source: String,
}

impl CodesEnvelope {
    /// Returns `true` if the collaborator flagged this body as an error.
    pub fn is_error(&self) -> bool {
        self.error || self.source.as_deref() == Some(SOURCE_ERROR_MARKER)
    }

    /// Split the envelope into a page or a `SourceReported` error.
    pub fn into_page(self, body: &str) -> Result<CodesPage, Error> {
        if self.is_error() {
            return Err(Error::SourceReported {
                message: self
                    .message
                    .unwrap_or_else(|| "code source returned an error".into()),
                details: self.details.map(|d| match d {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                }),
            });
        }

        let Some(codes) = self.codes else {
            return Err(Error::Deserialization {
                message: "response has no `codes` array".into(),
                body: body.to_owned(),
            });
        };

        Ok(CodesPage {
            codes,
            source: self.source.unwrap_or_default(),
        })
    }
}

/// Body sent to the redemption sink. Only the code token travels.
#[derive(Debug, Clone, Serialize)]
pub struct RedeemRequest<'a> {
    pub code: &'a str,
}

/// Redemption sink answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RedeemResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Blank cells read as `None`.
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_string(deserializer)?;
    Ok((!text.is_empty()).then_some(text))
}
