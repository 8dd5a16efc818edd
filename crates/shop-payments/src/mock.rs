//! Mock Payment Processor
//!
//! For testing and demo purposes. Creates intents in memory and confirms
//! them according to a configurable outcome.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::confirm::{CardInput, ClientSecret, ConfirmedIntent, PaymentConfirmer, PaymentIntentStatus};
use crate::error::{PaymentError, Result};
use crate::intent::{CreatedIntent, IntentProcessor};

/// What a confirmation attempt should do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Confirmation completes with the given status
    Status(PaymentIntentStatus),

    /// The card is rejected with this message
    CardError(String),
}

#[derive(Debug, Default)]
struct Ledger {
    intents: HashMap<String, (CreatedIntent, i64)>,
    created: Vec<i64>,
    create_attempts: usize,
    confirmations: usize,
}

/// In-memory processor implementing both sides of the intent flow
pub struct MockProcessor {
    ledger: Mutex<Ledger>,
    create_failure: Option<String>,
    outcome: ConfirmOutcome,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessor {
    /// A processor whose confirmations succeed
    pub fn new() -> Self {
        Self {
            ledger: Mutex::new(Ledger::default()),
            create_failure: None,
            outcome: ConfirmOutcome::Status(PaymentIntentStatus::Succeeded),
        }
    }

    /// Make every intent creation fail with this processor message
    #[must_use]
    pub fn failing_create(mut self, message: impl Into<String>) -> Self {
        self.create_failure = Some(message.into());
        self
    }

    /// Set the confirmation outcome
    #[must_use]
    pub fn with_outcome(mut self, outcome: ConfirmOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Amounts of every successful create call, in order
    pub async fn created_amounts(&self) -> Vec<i64> {
        self.ledger.lock().await.created.clone()
    }

    /// Number of create calls that reached the processor, failed ones included
    pub async fn create_calls(&self) -> usize {
        self.ledger.lock().await.create_attempts
    }

    /// Number of confirmation attempts
    pub async fn confirm_calls(&self) -> usize {
        self.ledger.lock().await.confirmations
    }
}

#[async_trait]
impl IntentProcessor for MockProcessor {
    async fn create_intent(&self, amount: i64) -> Result<CreatedIntent> {
        self.ledger.lock().await.create_attempts += 1;

        if let Some(message) = &self.create_failure {
            return Err(PaymentError::Stripe(message.clone()));
        }

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("pi_mock{}", &suffix[..12]);
        let intent = CreatedIntent {
            client_secret: ClientSecret::new(format!("{id}_secret_{}", &suffix[12..])),
            id: id.clone(),
            amount,
        };

        let mut ledger = self.ledger.lock().await;
        ledger.created.push(amount);
        ledger
            .intents
            .insert(id, (intent.clone(), Utc::now().timestamp()));

        Ok(intent)
    }

    fn name(&self) -> &str {
        "MockProcessor"
    }
}

#[async_trait]
impl PaymentConfirmer for MockProcessor {
    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        _card: &CardInput,
    ) -> Result<ConfirmedIntent> {
        let mut ledger = self.ledger.lock().await;
        ledger.confirmations += 1;

        let (intent, created) = ledger
            .intents
            .get(secret.intent_id()?)
            .filter(|(intent, _)| intent.client_secret == *secret)
            .cloned()
            .ok_or_else(|| PaymentError::Stripe("No such payment_intent".into()))?;

        match &self.outcome {
            ConfirmOutcome::Status(status) => Ok(ConfirmedIntent {
                id: intent.id,
                amount: intent.amount,
                created,
                status: *status,
                currency: Some(crate::intent::CURRENCY.into()),
            }),
            ConfirmOutcome::CardError(message) => Err(PaymentError::Card(message.clone())),
        }
    }
}
