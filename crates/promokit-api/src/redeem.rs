// Redemption sink endpoint
//
// The sink is the system of record for the Active -> Redeemed transition.
// Its `{ success, message }` answer is returned as-is whatever the HTTP
// status; only bodies that are not a sink answer become errors.

use tracing::debug;

use crate::client::{PromoClient, body_preview};
use crate::error::Error;
use crate::models::{RedeemRequest, RedeemResponse};

impl PromoClient {
    /// Ask the sink to redeem `code`.
    ///
    /// `POST {redeem_url}` with `{"code": "..."}`
    ///
    /// `Ok` carries the sink's explicit verdict, including `success: false`.
    /// `Err` means no verdict was obtained: transport failure, timeout, or a
    /// response that is not a sink answer (`Error::Http` for non-success
    /// statuses, `Error::Deserialization` for a garbled 2xx).
    pub async fn redeem_code(&self, code: &str) -> Result<RedeemResponse, Error> {
        debug!(code, "submitting redemption");
        let raw = self
            .post_json(self.redeem_url(), &RedeemRequest { code })
            .await?;

        match serde_json::from_str::<RedeemResponse>(&raw.body) {
            Ok(answer) => Ok(answer),
            Err(_) if !raw.status.is_success() => Err(Error::Http {
                status: raw.status.as_u16(),
                message: if raw.body.trim().is_empty() {
                    raw.status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_owned()
                } else {
                    body_preview(&raw.body)
                },
            }),
            Err(e) => Err(Error::Deserialization {
                message: format!("{e} (body preview: {:?})", body_preview(&raw.body)),
                body: raw.body,
            }),
        }
    }
}
