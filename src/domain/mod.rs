//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `credits` - Webhook verification, pricing and credit grants

pub mod credits;
