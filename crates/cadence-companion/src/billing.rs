// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription checkout.
//!
//! Input is validated before any network call. The checkout then creates
//! the customer, attaches the payment method, and starts the subscription,
//! in that order, stopping at the first failure.

use cadence_core::CadenceError;
use tracing::info;

use crate::client::CompanionClient;
use crate::guard::InFlightGuard;
use crate::types::{
    AttachPaymentMethodRequest, CreateCustomerRequest, CreateSubscriptionRequest, Plan,
    Subscription,
};

/// What the checkout form collected.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub plan: Option<Plan>,
    pub terms_accepted: bool,
    /// Payment method created client-side by the card form.
    pub payment_method_id: Option<String>,
}

/// A form that passed validation.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub plan: Plan,
    pub payment_method_id: String,
}

impl CheckoutForm {
    pub fn validate(&self) -> Result<Checkout, CadenceError> {
        let Some(plan) = self.plan else {
            return Err(CadenceError::Validation("Please select a plan".into()));
        };
        if !self.terms_accepted {
            return Err(CadenceError::Validation(
                "Please accept the terms of service".into(),
            ));
        }
        if self.user_id.trim().is_empty() {
            return Err(CadenceError::Validation("You need to be signed in".into()));
        }
        let email = self.email.trim();
        if !email.contains('@') {
            return Err(CadenceError::Validation("Please enter a valid email".into()));
        }
        let payment_method_id = self
            .payment_method_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CadenceError::Validation("Please add a payment method".into()))?;

        Ok(Checkout {
            user_id: self.user_id.trim().to_string(),
            email: email.to_string(),
            name: self.name.trim().to_string(),
            plan,
            payment_method_id: payment_method_id.to_string(),
        })
    }
}

/// Result of a completed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutResult {
    pub customer_id: String,
    pub subscription: Subscription,
}

/// Runs checkouts through one client, one at a time.
#[derive(Debug)]
pub struct Billing {
    client: CompanionClient,
    in_flight: InFlightGuard,
}

impl Billing {
    pub fn new(client: CompanionClient) -> Self {
        Self {
            client,
            in_flight: InFlightGuard::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Validates `form` and subscribes. Rejected while another checkout runs.
    pub async fn checkout(&self, form: &CheckoutForm) -> Result<CheckoutResult, CadenceError> {
        let checkout = form.validate()?;
        self.in_flight
            .run(async {
                let customer_id = self
                    .client
                    .create_customer(&CreateCustomerRequest {
                        user_id: checkout.user_id.clone(),
                        email: checkout.email.clone(),
                        name: checkout.name.clone(),
                    })
                    .await?;
                self.client
                    .attach_payment_method(&AttachPaymentMethodRequest {
                        customer_id: customer_id.clone(),
                        payment_method_id: checkout.payment_method_id.clone(),
                    })
                    .await?;
                let subscription = self
                    .client
                    .create_subscription(&CreateSubscriptionRequest {
                        customer_id: customer_id.clone(),
                        plan: checkout.plan,
                        payment_method_id: checkout.payment_method_id.clone(),
                    })
                    .await?;
                info!(
                    plan = %checkout.plan,
                    status = %subscription.status,
                    "subscription created"
                );
                Ok(CheckoutResult {
                    customer_id,
                    subscription,
                })
            })
            .await
    }

    /// Billing portal URL for managing an existing subscription.
    pub async fn portal(&self, customer_id: &str, return_url: &str) -> Result<String, CadenceError> {
        self.in_flight
            .run(self.client.create_portal_session(customer_id, return_url))
            .await
    }
}
