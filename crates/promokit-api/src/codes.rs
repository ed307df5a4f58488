// Code source endpoint
//
// A single cache-bypassing GET returning the whole code list. There is no
// pagination and no conditional request: every call is a full read.

use tracing::debug;

use crate::client::{PromoClient, body_preview};
use crate::error::Error;
use crate::models::{CodesEnvelope, CodesPage};

impl PromoClient {
    /// List every promo code the source currently knows about.
    ///
    /// `GET {source_url}?_ts={millis}`
    ///
    /// Both the explicit error shape and non-success statuses become
    /// errors. An error-shaped body is preferred over the bare status when
    /// both are present, since it carries the collaborator's own message.
    pub async fn list_codes(&self) -> Result<CodesPage, Error> {
        debug!("listing promo codes");
        let raw = self.get_uncached(self.source_url()).await?;

        let parsed = serde_json::from_str::<CodesEnvelope>(&raw.body);

        if !raw.status.is_success() {
            if let Ok(envelope) = parsed {
                if envelope.is_error() {
                    return envelope.into_page(&raw.body);
                }
            }
            return Err(Error::Http {
                status: raw.status.as_u16(),
                message: raw
                    .status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned(),
            });
        }

        let envelope = parsed.map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", body_preview(&raw.body)),
            body: raw.body.clone(),
        })?;

        let page = envelope.into_page(&raw.body)?;
        debug!(count = page.codes.len(), source = %page.source, "codes listed");
        Ok(page)
    }
}
