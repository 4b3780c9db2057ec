//! order-relay - webhook order intake and delivery dispatch
//!
//! Receives order webhooks from an online-ordering platform, normalizes them
//! into a canonical record, persists them idempotently and forwards delivery
//! orders to a courier partner exactly once per order.

pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod http;
pub mod interfaces;
pub mod orders;
pub mod storage;
pub mod utils;
