//! Memberstack member directory adapter.
//!
//! Implements the `MemberDirectory` port against the Memberstack admin REST
//! API, authenticated with a bearer secret.

mod memberstack_adapter;

pub use memberstack_adapter::{MemberstackConfig, MemberstackDirectory};
