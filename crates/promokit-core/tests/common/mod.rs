// In-memory collaborators shared by the integration tests.
//
// `Ledger` plays both roles: it lists its records as the code source and
// redeems them as the sink, with a compare-and-set under one lock the way
// a real system of record must.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use promokit_api::{CodeRecord, CodesPage, RedeemResponse};
use promokit_core::{CodeSource, RedemptionSink};

pub const ALREADY_REDEEMED: &str = "Code has already been redeemed";
pub const REDEMPTION_DATE: &str = "2024-07-04";

pub struct Ledger {
    records: Mutex<Vec<CodeRecord>>,
    sink_delay: Mutex<Duration>,
    fetches: AtomicUsize,
    sink_calls: Mutex<Vec<String>>,
}

impl Ledger {
    pub fn new(records: Vec<CodeRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            sink_delay: Mutex::new(Duration::ZERO),
            fetches: AtomicUsize::new(0),
            sink_calls: Mutex::new(Vec::new()),
        }
    }

    /// `A1` active, `B2` redeemed on 2024-01-01.
    pub fn a1_b2() -> Self {
        Self::new(vec![
            record("1", "A1", "Free dessert", None),
            record("2", "B2", "Free coffee", Some("2024-01-01")),
        ])
    }

    pub fn with_sink_delay(self, delay: Duration) -> Self {
        *self.sink_delay.lock().unwrap() = delay;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn sink_calls(&self) -> Vec<String> {
        self.sink_calls.lock().unwrap().clone()
    }

    pub fn status_of(&self, code: &str) -> String {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.code == code)
            .map(|r| r.status.clone())
            .unwrap_or_default()
    }

    /// Another till redeems `code` without this desk knowing.
    pub fn redeem_elsewhere(&self, code: &str) {
        let mut records = self.records.lock().unwrap();
        let record = records.iter_mut().find(|r| r.code == code).unwrap();
        record.status = "redeemed".into();
        record.redemption_date = Some(REDEMPTION_DATE.into());
    }

    fn compare_and_set(&self, code: &str) -> RedeemResponse {
        let mut records = self.records.lock().unwrap();
        let active = records
            .iter_mut()
            .find(|r| r.code.eq_ignore_ascii_case(code) && r.status == "active");
        match active {
            Some(record) => {
                record.status = "redeemed".into();
                record.redemption_date = Some(REDEMPTION_DATE.into());
                RedeemResponse {
                    success: true,
                    message: None,
                }
            }
            None => RedeemResponse {
                success: false,
                message: Some(ALREADY_REDEEMED.into()),
            },
        }
    }
}

impl CodeSource for Ledger {
    async fn fetch_codes(&self) -> Result<CodesPage, promokit_api::Error> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let codes = self.records.lock().unwrap().clone();
        Ok(CodesPage {
            codes,
            source: "ledger".into(),
        })
    }
}

impl RedemptionSink for Ledger {
    async fn submit_redemption(&self, code: &str) -> Result<RedeemResponse, promokit_api::Error> {
        self.sink_calls.lock().unwrap().push(code.to_owned());
        let delay = *self.sink_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.compare_and_set(code))
    }
}

pub fn record(id: &str, code: &str, description: &str, redeemed_on: Option<&str>) -> CodeRecord {
    CodeRecord {
        id: id.into(),
        code: code.into(),
        description: description.into(),
        bonus_item: None,
        customer: None,
        value: "$5".into(),
        status: if redeemed_on.is_some() { "redeemed" } else { "active" }.into(),
        redemption_date: redeemed_on.map(Into::into),
    }
}
