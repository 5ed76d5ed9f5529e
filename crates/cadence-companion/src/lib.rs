// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client side of the Cadence companion server.
//!
//! The companion server proxies Stripe billing and Google Calendar. This
//! crate holds the JSON client, the checkout flow with its input validation,
//! the calendar connector that keeps tokens in local settings, bounded
//! email-verification polling, and an in-flight guard against duplicate
//! submissions.

pub mod billing;
pub mod calendar;
pub mod client;
pub mod guard;
pub mod types;
pub mod verify;

pub use billing::{Billing, Checkout, CheckoutForm, CheckoutResult};
pub use calendar::CalendarConnector;
pub use client::CompanionClient;
pub use guard::InFlightGuard;
pub use types::{CalendarEvent, Plan};
pub use verify::{VerificationOutcome, VerificationPoller};
