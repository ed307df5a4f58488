// ── Redemption engine ──
//
// Validates a submitted code against a snapshot, then asks the sink to
// redeem it.
//
// The snapshot check is a fast path only. Two desks (or two tasks on one
// desk) can both see a code as active, and nothing here serializes them:
// the sink's atomic compare-and-set is the single authority on whether a
// code has been used. The engine never takes a local lock around `redeem`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::collaborator::RedemptionSink;
use crate::error::CoreError;
use crate::model::{PromoCode, RedemptionAttempt, RedemptionResult, Snapshot};
use crate::store::{RefreshReason, RefreshTrigger};

const DEFAULT_REJECTION: &str = "The code could not be redeemed";

/// Check `attempt` against `snapshot` without contacting anyone.
///
/// Blank or unknown codes give `CodeNotFound`; a code whose only matching
/// record is redeemed gives `AlreadyRedeemed`.
pub fn validate<'a>(
    snapshot: &'a Snapshot,
    attempt: &RedemptionAttempt,
) -> Result<&'a PromoCode, CoreError> {
    let not_found = || CoreError::CodeNotFound {
        code: attempt.submitted_code.trim().to_owned(),
    };
    if attempt.is_blank() {
        return Err(not_found());
    }

    let record = snapshot.find(&attempt.submitted_code).ok_or_else(not_found)?;
    match record.redemption_date() {
        None => Ok(record),
        Some(date) => Err(CoreError::AlreadyRedeemed {
            code: record.code.clone(),
            redemption_date: date.to_owned(),
        }),
    }
}

pub struct RedemptionEngine<S> {
    sink: Arc<S>,
    refresh: RefreshTrigger,
}

impl<S> Clone for RedemptionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            refresh: self.refresh.clone(),
        }
    }
}

impl<S: RedemptionSink> RedemptionEngine<S> {
    pub fn new(sink: Arc<S>, refresh: RefreshTrigger) -> Self {
        Self { sink, refresh }
    }

    /// Redeem `submitted` against `snapshot`.
    ///
    /// Validation failures return before the sink is contacted. Once the
    /// sink call starts it runs on its own task: dropping this future
    /// cannot cut a redemption off halfway, and the task still requests a
    /// refresh whatever the outcome.
    pub async fn redeem(
        &self,
        snapshot: &Snapshot,
        submitted: &str,
    ) -> Result<RedemptionResult, CoreError> {
        let attempt = RedemptionAttempt::new(submitted);
        let record = match validate(snapshot, &attempt) {
            Ok(record) => record.clone(),
            Err(e) => {
                info!(
                    code = attempt.submitted_code.trim(),
                    outcome = %e.kind(),
                    "redemption refused locally"
                );
                return Err(e);
            }
        };

        let sink = Arc::clone(&self.sink);
        let refresh = self.refresh.clone();
        let code = record.code.clone();
        let call = tokio::spawn(async move {
            let outcome = sink.submit_redemption(&code).await;
            let reason = match &outcome {
                Ok(answer) if answer.success => RefreshReason::Redeemed { code },
                Ok(_) => RefreshReason::Rejected { code },
                Err(_) => RefreshReason::Unreachable { code },
            };
            refresh.request(reason);
            outcome
        });

        let outcome = match call.await {
            Ok(outcome) => outcome,
            Err(join) => {
                warn!(code = %record.code, error = %join, "redemption task failed");
                return Err(CoreError::SinkUnreachable {
                    reason: format!("redemption task failed: {join}"),
                    timed_out: false,
                });
            }
        };

        match outcome {
            Ok(answer) if answer.success => {
                info!(code = %record.code, "code redeemed");
                Ok(RedemptionResult {
                    id: record.id,
                    code: record.code,
                    description: record.description,
                    redeemed_at: attempt.timestamp,
                    message: answer.message,
                })
            }
            Ok(answer) => {
                let message = answer.message.unwrap_or_else(|| DEFAULT_REJECTION.into());
                info!(code = %record.code, %message, "redemption rejected by sink");
                Err(CoreError::SinkRejected { message })
            }
            Err(e) => {
                let err = CoreError::from_sink(e);
                warn!(code = %record.code, error = %err, "redemption outcome unknown");
                Err(err)
            }
        }
    }
}
