pub mod booking;
pub mod notify;
pub mod numbers;
pub mod payment;
pub mod quote;

pub use booking::BookingLifecycle;
pub use notify::{LogNotifier, NotificationTemplate, Notifier};
pub use numbers::{booking_number, quote_number};
pub use payment::{
    MockPaymentAdapter, PaymentAdapter, PaymentIntent, PaymentIntentStatus, PaymentOrchestrator,
    RefundOutcome,
};
pub use quote::QuoteLifecycle;
