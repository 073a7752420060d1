//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - Stripe webhook verification and session lookup
//! - `MemberDirectory` - Member lookup and credit balance writes
//! - `WebhookEventRepository` - Stripe webhook idempotency tracking

mod member_directory;
mod payment_provider;
mod webhook_event_repository;

pub use member_directory::{DirectoryError, MemberDirectory};
pub use payment_provider::{
    CheckoutSessionDetails, PaymentError, PaymentErrorCode, PaymentProvider, PurchasedItem,
};
pub use webhook_event_repository::{
    ProcessingStatus, SaveResult, StoreError, WebhookEventRecord, WebhookEventRepository,
};
