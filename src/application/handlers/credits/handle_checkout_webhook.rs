//! HandleCheckoutWebhookHandler - Grants credits for completed Stripe checkouts.
//!
//! Pipeline per request:
//!
//! 1. Verify the signature and parse the event
//! 2. Ignore anything that is not `checkout.session.completed`
//! 3. Claim the event id so redeliveries are credited once
//! 4. Retrieve the session, resolve purchaser email and price
//! 5. Read the member's balance and patch `existing + credits`
//!
//! Step 5 runs under a per-purchaser lock so two checkouts by the same
//! email in this process cannot overwrite each other's increment.
//!
//! Steps 4-5 run in a spawned task that the request awaits. If the request
//! is dropped (timeout, client disconnect) the task still finishes and
//! settles the claim.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::credits::{
    CreditGrant, PriceCreditTable, StripeEvent, StripeEventType, WebhookError,
};
use crate::ports::{
    MemberDirectory, PaymentProvider, SaveResult, WebhookEventRecord, WebhookEventRepository,
};

/// Command to handle a checkout webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleCheckoutWebhookCommand {
    /// Raw webhook payload, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if the request carried one.
    pub signature: Option<String>,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleCheckoutWebhookResult {
    /// Credits were added to the purchaser's balance.
    CreditsGranted {
        event_id: String,
        email: String,
        grant: CreditGrant,
    },
    /// Event type is not handled.
    Ignored { event_type: String },
    /// Event id was already processed by an earlier delivery.
    AlreadyProcessed { event_id: String },
}

/// Handler for Stripe checkout webhooks.
///
/// Cheap to clone; clones share the ports and the purchaser locks.
#[derive(Clone)]
pub struct HandleCheckoutWebhookHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    member_directory: Arc<dyn MemberDirectory>,
    event_repository: Arc<dyn WebhookEventRepository>,
    price_table: Arc<PriceCreditTable>,
    purchaser_locks: Arc<PurchaserLocks>,
}

impl HandleCheckoutWebhookHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        member_directory: Arc<dyn MemberDirectory>,
        event_repository: Arc<dyn WebhookEventRepository>,
        price_table: Arc<PriceCreditTable>,
    ) -> Self {
        Self {
            payment_provider,
            member_directory,
            event_repository,
            price_table,
            purchaser_locks: Arc::new(PurchaserLocks::default()),
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleCheckoutWebhookCommand,
    ) -> Result<HandleCheckoutWebhookResult, WebhookError> {
        // 1. Verify webhook signature and parse event
        let signature = cmd.signature.ok_or(WebhookError::MissingSignature)?;
        let event = self
            .payment_provider
            .verify_and_parse_event(&cmd.payload, &signature)?;

        // 2. Filter by type
        if event.parsed_type() != StripeEventType::CheckoutSessionCompleted {
            tracing::debug!(
                event_id = %event.id,
                event_type = %event.event_type,
                "Ignoring webhook event type"
            );
            return Ok(HandleCheckoutWebhookResult::Ignored {
                event_type: event.event_type,
            });
        }

        // 3. Claim the event id
        let claim = WebhookEventRecord::in_progress(&event.id, &event.event_type);
        match self.event_repository.claim(claim).await? {
            SaveResult::Inserted => {}
            SaveResult::Completed => {
                tracing::info!(event_id = %event.id, "Webhook event already processed");
                return Ok(HandleCheckoutWebhookResult::AlreadyProcessed { event_id: event.id });
            }
            SaveResult::InProgress => {
                tracing::info!(
                    event_id = %event.id,
                    "Webhook event is being processed by another delivery"
                );
                return Err(WebhookError::ProcessingInProgress(event.id));
            }
        }

        // 4-5. Grant and settle the claim, detached from this request
        let handler = self.clone();
        tokio::spawn(async move { handler.process_claimed(event).await })
            .await
            .map_err(|e| WebhookError::Task(e.to_string()))?
    }

    /// Grants credits for a claimed event, then marks it completed or
    /// releases it.
    async fn process_claimed(
        &self,
        event: StripeEvent,
    ) -> Result<HandleCheckoutWebhookResult, WebhookError> {
        match self.grant_credits(&event).await {
            Ok(result) => {
                if let HandleCheckoutWebhookResult::CreditsGranted { grant, .. } = &result {
                    let outcome = format!(
                        "{}: {} -> {}",
                        grant.member_id, grant.previous_balance, grant.new_balance
                    );
                    if let Err(e) = self.event_repository.mark_completed(&event.id, outcome).await
                    {
                        tracing::warn!(
                            event_id = %event.id,
                            error = %e,
                            "Credits granted but event could not be marked completed"
                        );
                    }
                }
                Ok(result)
            }
            Err(err) => {
                tracing::error!(
                    event_id = %event.id,
                    session_id = event.object_id().unwrap_or("<none>"),
                    error = %err,
                    "Checkout webhook processing failed"
                );
                if let Err(e) = self.event_repository.release(&event.id).await {
                    tracing::error!(
                        event_id = %event.id,
                        error = %e,
                        "Failed to release webhook claim"
                    );
                }
                Err(err)
            }
        }
    }

    async fn grant_credits(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleCheckoutWebhookResult, WebhookError> {
        let session_id = event
            .object_id()
            .ok_or(WebhookError::MissingField("data.object.id"))?;

        let session = self
            .payment_provider
            .retrieve_checkout_session(session_id)
            .await?;

        let email = session
            .customer_email
            .clone()
            .ok_or(WebhookError::MissingEmail)?;
        let price_id = session
            .primary_price_id()
            .ok_or(WebhookError::MissingLineItem)?;
        let credits = self.price_table.credits_for(price_id)?;

        let lock = self.purchaser_locks.acquire(&email).await;
        let result = async {
            let _guard = lock.lock().await;

            let members = self.member_directory.find_members_by_email(&email).await?;
            let member = members
                .first()
                .ok_or_else(|| WebhookError::MemberNotFound(email.clone()))?;
            if members.len() > 1 {
                tracing::warn!(
                    email = %email,
                    match_count = members.len(),
                    member_id = %member.id,
                    "Several members share this email; crediting the first"
                );
            }

            let grant =
                CreditGrant::compute(member, self.member_directory.credit_field(), credits)?;
            self.member_directory
                .patch_member_credits(&grant.member_id, grant.new_balance)
                .await?;

            Ok::<_, WebhookError>(grant)
        }
        .await;
        drop(lock);
        self.purchaser_locks.prune(&email).await;

        let grant = result?;
        tracing::info!(
            event_id = %event.id,
            email = %email,
            price_id,
            previous_balance = grant.previous_balance,
            new_balance = grant.new_balance,
            "{}: {} → {} credits",
            email,
            grant.previous_balance,
            grant.new_balance
        );

        Ok(HandleCheckoutWebhookResult::CreditsGranted {
            event_id: event.id.clone(),
            email,
            grant,
        })
    }
}

/// Per-purchaser async locks, keyed by normalised email.
#[derive(Default)]
struct PurchaserLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PurchaserLocks {
    fn key(email: &str) -> String {
        email.trim().to_lowercase()
    }

    async fn acquire(&self, email: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(Self::key(email)).or_default().clone()
    }

    /// Drops the entry once no request holds it.
    async fn prune(&self, email: &str) {
        let key = Self::key(email);
        let mut locks = self.locks.lock().await;
        if locks.get(&key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&key);
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
