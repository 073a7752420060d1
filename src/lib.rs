//! Credit Bridge - Stripe checkout webhooks to Memberstack credits
//!
//! Receives Stripe's `checkout.session.completed` notification, verifies
//! its signature, maps the purchased price to a credit count and adds
//! those credits to the purchaser's Memberstack balance.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
