// promokit-api: Async Rust client for the promo code source and redemption sink

pub mod client;
pub mod codes;
pub mod error;
pub mod models;
pub mod redeem;
pub mod transport;

pub use client::PromoClient;
pub use error::Error;
pub use models::{CodeRecord, CodesPage, RedeemResponse};
pub use transport::{TlsMode, TransportConfig};
