use chrono::Utc;
use transfer_domain::{EngineError, EngineResult, QuoteRequest, QuoteStatus};
use uuid::Uuid;

/// Guard-validated transitions for a quote request. As with bookings,
/// these are the only writers to `status`.
pub struct QuoteLifecycle;

impl QuoteLifecycle {
    /// An operator picked the request up.
    pub fn start_review(quote: &mut QuoteRequest) -> EngineResult<()> {
        if quote.status != QuoteStatus::Pendente {
            return Err(Self::invalid(quote, QuoteStatus::EmAnalise));
        }
        quote.status = QuoteStatus::EmAnalise;
        quote.touch();
        Ok(())
    }

    /// The operator sets the price and notes. The caller dispatches the
    /// payment-link email after the transition commits.
    pub fn set_quote(
        quote: &mut QuoteRequest,
        price_cents: i64,
        notes: Option<String>,
    ) -> EngineResult<()> {
        if !matches!(
            quote.status,
            QuoteStatus::Pendente | QuoteStatus::EmAnalise
        ) {
            return Err(Self::invalid(quote, QuoteStatus::Cotado));
        }
        if price_cents <= 0 {
            return Err(EngineError::Validation(
                "quote price must be positive".to_string(),
            ));
        }
        quote.admin_quote_price_cents = Some(price_cents);
        quote.admin_notes = notes;
        quote.quoted_at = Some(Utc::now());
        quote.status = QuoteStatus::Cotado;
        quote.touch();
        Ok(())
    }

    /// The operator changes an already-quoted price. Only allowed before
    /// the payment link exists; once an intent is out the old price may
    /// already be in front of the customer, so a revision is rejected.
    pub fn revise_quote(
        quote: &mut QuoteRequest,
        price_cents: i64,
        notes: Option<String>,
    ) -> EngineResult<()> {
        if quote.status != QuoteStatus::Cotado || quote.payment_intent_id.is_some() {
            return Err(Self::invalid(quote, QuoteStatus::Cotado));
        }
        if price_cents <= 0 {
            return Err(EngineError::Validation(
                "quote price must be positive".to_string(),
            ));
        }
        quote.admin_quote_price_cents = Some(price_cents);
        quote.admin_notes = notes;
        quote.quoted_at = Some(Utc::now());
        quote.touch();
        Ok(())
    }

    /// Customer accepted the quoted price (recorded when payment starts).
    pub fn accept(quote: &mut QuoteRequest) -> EngineResult<()> {
        if quote.status != QuoteStatus::Cotado {
            return Err(Self::invalid(quote, QuoteStatus::Aceito));
        }
        quote.status = QuoteStatus::Aceito;
        quote.touch();
        Ok(())
    }

    pub fn decline(quote: &mut QuoteRequest) -> EngineResult<()> {
        if quote.status != QuoteStatus::Cotado {
            return Err(Self::invalid(quote, QuoteStatus::Recusado));
        }
        quote.status = QuoteStatus::Recusado;
        quote.touch();
        Ok(())
    }

    /// Any non-terminal request may be cancelled by an operator.
    pub fn cancel(quote: &mut QuoteRequest) -> EngineResult<()> {
        if quote.status.is_terminal() {
            return Err(Self::invalid(quote, QuoteStatus::Cancelado));
        }
        quote.status = QuoteStatus::Cancelado;
        quote.touch();
        Ok(())
    }

    /// Conversion happens only as a side effect of successful payment on
    /// the generated booking: the payment webhook accepts the quote and
    /// then converts it, so a direct Cotado → Convertido write is never
    /// possible.
    pub fn mark_converted(quote: &mut QuoteRequest, booking_id: Uuid) -> EngineResult<()> {
        if quote.status != QuoteStatus::Aceito {
            return Err(Self::invalid(quote, QuoteStatus::Convertido));
        }
        quote.status = QuoteStatus::Convertido;
        quote.booking_id = Some(booking_id);
        quote.converted_at = Some(Utc::now());
        quote.touch();
        Ok(())
    }

    fn invalid(quote: &QuoteRequest, to: QuoteStatus) -> EngineError {
        EngineError::InvalidStateTransition {
            from: quote.status.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use transfer_domain::{DriverLanguage, ServiceType, TripLeg, TripRequest};

    fn quote() -> QuoteRequest {
        QuoteRequest::new(
            "COT-20260827-TEST".to_string(),
            TripRequest {
                service: ServiceType::OneWay,
                outbound: TripLeg {
                    origin: "GRU".to_string(),
                    destination: "Campos do Jordão".to_string(),
                    route_id: None,
                    date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                    time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                    distance_km: 220.0,
                    duration_minutes: 180,
                    hours: None,
                },
                return_leg: None,
            },
            Uuid::new_v4(),
            "Sedan".to_string(),
            DriverLanguage::Pt,
            "Maria".to_string(),
            "maria@example.com".to_string(),
            None,
        )
    }

    #[test]
    fn full_happy_path() {
        let mut q = quote();
        QuoteLifecycle::start_review(&mut q).unwrap();
        QuoteLifecycle::set_quote(&mut q, 80000, Some("Inclui pedágios".to_string())).unwrap();
        assert_eq!(q.status, QuoteStatus::Cotado);
        assert!(q.quoted_at.is_some());

        QuoteLifecycle::accept(&mut q).unwrap();
        let booking_id = Uuid::new_v4();
        QuoteLifecycle::mark_converted(&mut q, booking_id).unwrap();
        assert_eq!(q.status, QuoteStatus::Convertido);
        assert_eq!(q.booking_id, Some(booking_id));
        assert!(q.converted_at.is_some());
    }

    #[test]
    fn quoting_straight_from_pendente_is_allowed() {
        let mut q = quote();
        QuoteLifecycle::set_quote(&mut q, 80000, None).unwrap();
        assert_eq!(q.status, QuoteStatus::Cotado);
    }

    #[test]
    fn cotado_cannot_convert_without_payment() {
        let mut q = quote();
        QuoteLifecycle::set_quote(&mut q, 80000, None).unwrap();
        let err = QuoteLifecycle::mark_converted(&mut q, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
        assert_eq!(q.status, QuoteStatus::Cotado);
        assert!(q.booking_id.is_none());
    }

    #[test]
    fn converted_quote_cannot_be_requoted() {
        let mut q = quote();
        QuoteLifecycle::set_quote(&mut q, 80000, None).unwrap();
        QuoteLifecycle::accept(&mut q).unwrap();
        QuoteLifecycle::mark_converted(&mut q, Uuid::new_v4()).unwrap();

        let err = QuoteLifecycle::set_quote(&mut q, 90000, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
    }

    #[test]
    fn revision_updates_price_before_link_is_issued() {
        let mut q = quote();
        QuoteLifecycle::set_quote(&mut q, 80000, None).unwrap();
        QuoteLifecycle::revise_quote(&mut q, 95000, Some("Pedágio incluso".to_string()))
            .unwrap();

        assert_eq!(q.status, QuoteStatus::Cotado);
        assert_eq!(q.admin_quote_price_cents, Some(95000));
        assert_eq!(q.admin_notes.as_deref(), Some("Pedágio incluso"));
    }

    #[test]
    fn revision_rejected_once_intent_exists() {
        let mut q = quote();
        QuoteLifecycle::set_quote(&mut q, 80000, None).unwrap();
        q.payment_intent_id = Some("pi_1".to_string());

        let err = QuoteLifecycle::revise_quote(&mut q, 95000, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
        assert_eq!(q.admin_quote_price_cents, Some(80000));
    }

    #[test]
    fn revision_rejected_before_first_quote() {
        let mut q = quote();
        let err = QuoteLifecycle::revise_quote(&mut q, 95000, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
    }

    #[test]
    fn cancel_any_non_terminal_state() {
        let mut q = quote();
        QuoteLifecycle::cancel(&mut q).unwrap();
        assert_eq!(q.status, QuoteStatus::Cancelado);

        let err = QuoteLifecycle::cancel(&mut q).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut q = quote();
        assert!(QuoteLifecycle::set_quote(&mut q, 0, None).is_err());
        assert_eq!(q.status, QuoteStatus::Pendente);
    }
}
