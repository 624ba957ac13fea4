use chrono::Utc;
use transfer_domain::{
    Booking, BookingStatus, EngineError, EngineResult, PaymentStatus, RefundInfo,
};

/// Guard-validated transitions over a booking's two status axes. These
/// functions are the only writers to `status` and `payment_status`; every
/// guard is checked before any mutation, so a rejected transition leaves
/// the booking untouched.
pub struct BookingLifecycle;

impl BookingLifecycle {
    /// Payment-success callback. Idempotent: replaying the confirmation for
    /// the intent already recorded on a paid booking is a no-op (`Ok(false)`).
    /// A confirmation for a *different* intent on a paid booking is rejected.
    pub fn confirm_payment(booking: &mut Booking, intent_id: &str) -> EngineResult<bool> {
        if booking.payment_status == PaymentStatus::Pago {
            if booking.payment_intent_id.as_deref() == Some(intent_id) {
                return Ok(false);
            }
            return Err(EngineError::InvalidStateTransition {
                from: booking.payment_status.as_str().to_string(),
                to: PaymentStatus::Pago.as_str().to_string(),
            });
        }
        if booking.status == BookingStatus::Cancelada
            || booking.payment_status == PaymentStatus::Reembolsado
        {
            return Err(EngineError::InvalidStateTransition {
                from: booking.payment_status.as_str().to_string(),
                to: PaymentStatus::Pago.as_str().to_string(),
            });
        }

        booking.payment_intent_id = Some(intent_id.to_string());
        booking.payment_status = PaymentStatus::Pago;
        if booking.status == BookingStatus::Pendente {
            booking.status = BookingStatus::Confirmada;
        }
        booking.touch();
        Ok(true)
    }

    /// Payment-failure callback from the gateway.
    pub fn mark_payment_failed(booking: &mut Booking, intent_id: &str) -> EngineResult<()> {
        if booking.payment_status != PaymentStatus::Aguardando {
            return Err(EngineError::InvalidStateTransition {
                from: booking.payment_status.as_str().to_string(),
                to: PaymentStatus::Falhou.as_str().to_string(),
            });
        }
        booking.payment_intent_id = Some(intent_id.to_string());
        booking.payment_status = PaymentStatus::Falhou;
        booking.touch();
        Ok(())
    }

    /// Refund: only a paid booking, and only with a reason. Cancels the
    /// booking and stamps the refund fields.
    pub fn refund(booking: &mut Booking, refund_id: &str, reason: &str) -> EngineResult<()> {
        Self::begin_refund(booking, reason)?;
        Self::finish_refund(booking, refund_id)
    }

    /// Reserve the refund before any money moves. Run under the store lock:
    /// flipping `payment_status` off Pago here means a concurrent refund
    /// attempt fails this guard before it can reach the gateway. The trip
    /// status is untouched until the gateway confirms.
    pub fn begin_refund(booking: &mut Booking, reason: &str) -> EngineResult<()> {
        if booking.payment_status != PaymentStatus::Pago {
            return Err(EngineError::RefundNotAllowed(format!(
                "payment status is {}",
                booking.payment_status.as_str()
            )));
        }
        if reason.trim().is_empty() {
            return Err(EngineError::RefundNotAllowed(
                "a refund reason is required".to_string(),
            ));
        }
        booking.payment_status = PaymentStatus::Reembolsado;
        booking.refund = Some(RefundInfo {
            refund_id: String::new(),
            refund_date: Utc::now(),
            refund_reason: reason.trim().to_string(),
        });
        booking.touch();
        Ok(())
    }

    /// Complete a reserved refund with the gateway's refund id; cancels the
    /// booking.
    pub fn finish_refund(booking: &mut Booking, refund_id: &str) -> EngineResult<()> {
        match booking.refund.as_mut() {
            Some(info) if booking.payment_status == PaymentStatus::Reembolsado => {
                info.refund_id = refund_id.to_string();
                info.refund_date = Utc::now();
                booking.status = BookingStatus::Cancelada;
                booking.touch();
                Ok(())
            }
            _ => Err(EngineError::InvalidStateTransition {
                from: booking.payment_status.as_str().to_string(),
                to: PaymentStatus::Reembolsado.as_str().to_string(),
            }),
        }
    }

    /// The gateway refused the reserved refund: restore the paid state so
    /// the booking can be refunded again later. The trip status was never
    /// touched by the reservation.
    pub fn abort_refund(booking: &mut Booking) -> EngineResult<()> {
        let reserved = booking.payment_status == PaymentStatus::Reembolsado
            && booking
                .refund
                .as_ref()
                .is_some_and(|info| info.refund_id.is_empty());
        if !reserved {
            return Err(EngineError::InvalidStateTransition {
                from: booking.payment_status.as_str().to_string(),
                to: PaymentStatus::Pago.as_str().to_string(),
            });
        }
        booking.payment_status = PaymentStatus::Pago;
        booking.refund = None;
        booking.touch();
        Ok(())
    }

    /// Resending the payment link changes no status; this guard is checked
    /// under the store lock before the notification is re-triggered.
    pub fn ensure_can_resend_link(booking: &Booking) -> EngineResult<()> {
        let payable = matches!(
            booking.payment_status,
            PaymentStatus::Aguardando | PaymentStatus::Falhou
        );
        if !payable || booking.status == BookingStatus::Cancelada {
            return Err(EngineError::InvalidStateTransition {
                from: format!(
                    "{}/{}",
                    booking.status.as_str(),
                    booking.payment_status.as_str()
                ),
                to: "resend_payment_link".to_string(),
            });
        }
        Ok(())
    }

    /// Trip completed.
    pub fn complete(booking: &mut Booking) -> EngineResult<()> {
        if booking.status != BookingStatus::Confirmada {
            return Err(EngineError::InvalidStateTransition {
                from: booking.status.as_str().to_string(),
                to: BookingStatus::Concluida.as_str().to_string(),
            });
        }
        booking.status = BookingStatus::Concluida;
        booking.touch();
        Ok(())
    }

    /// Cancel without refund (unpaid bookings, no-shows).
    pub fn cancel(booking: &mut Booking) -> EngineResult<()> {
        if booking.is_terminal() || booking.status == BookingStatus::Cancelada {
            return Err(EngineError::InvalidStateTransition {
                from: booking.status.as_str().to_string(),
                to: BookingStatus::Cancelada.as_str().to_string(),
            });
        }
        booking.status = BookingStatus::Cancelada;
        booking.touch();
        Ok(())
    }

    /// Operator override of the trip status, validated against the same
    /// transition table as the dedicated operations.
    pub fn override_status(booking: &mut Booking, target: BookingStatus) -> EngineResult<()> {
        match target {
            BookingStatus::Concluida => Self::complete(booking),
            BookingStatus::Cancelada => Self::cancel(booking),
            BookingStatus::Confirmada => {
                if booking.status != BookingStatus::Pendente {
                    return Err(EngineError::InvalidStateTransition {
                        from: booking.status.as_str().to_string(),
                        to: target.as_str().to_string(),
                    });
                }
                booking.status = BookingStatus::Confirmada;
                booking.touch();
                Ok(())
            }
            BookingStatus::Pendente => Err(EngineError::InvalidStateTransition {
                from: booking.status.as_str().to_string(),
                to: target.as_str().to_string(),
            }),
        }
    }

    /// Operator override of the payment status. Marking a booking paid
    /// without a payment intent, or refunded without refund data, is
    /// rejected.
    pub fn override_payment_status(
        booking: &mut Booking,
        target: PaymentStatus,
    ) -> EngineResult<()> {
        match target {
            PaymentStatus::Pago => {
                let intent = booking.payment_intent_id.clone().ok_or_else(|| {
                    EngineError::Validation(
                        "cannot mark as paid without a payment intent".to_string(),
                    )
                })?;
                Self::confirm_payment(booking, &intent).map(|_| ())
            }
            PaymentStatus::Reembolsado => Err(EngineError::RefundNotAllowed(
                "use the refund operation so refund data is recorded".to_string(),
            )),
            PaymentStatus::Falhou => {
                let intent = booking
                    .payment_intent_id
                    .clone()
                    .unwrap_or_else(|| "manual".to_string());
                Self::mark_payment_failed(booking, &intent)
            }
            PaymentStatus::Aguardando => {
                // Reopening payment is only meaningful after a failure.
                if booking.payment_status != PaymentStatus::Falhou {
                    return Err(EngineError::InvalidStateTransition {
                        from: booking.payment_status.as_str().to_string(),
                        to: target.as_str().to_string(),
                    });
                }
                booking.payment_status = PaymentStatus::Aguardando;
                booking.touch();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use transfer_domain::{
        DriverLanguage, LegBreakdown, ServiceType, TripLeg, TripRequest,
    };
    use uuid::Uuid;

    fn booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            booking_number: "TRF-20260827-TEST".to_string(),
            status: BookingStatus::Pendente,
            payment_status: PaymentStatus::Aguardando,
            trip: TripRequest {
                service: ServiceType::OneWay,
                outbound: TripLeg {
                    origin: "GRU".to_string(),
                    destination: "Centro".to_string(),
                    route_id: None,
                    date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                    time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                    distance_km: 30.0,
                    duration_minutes: 45,
                    hours: None,
                },
                return_leg: None,
            },
            vehicle_type_id: Uuid::new_v4(),
            vehicle_name: "Sedan".to_string(),
            driver_language: DriverLanguage::Pt,
            customer_name: "Maria".to_string(),
            customer_email: "maria@example.com".to_string(),
            customer_phone: None,
            outbound: LegBreakdown {
                base_price_cents: 15000,
                additional_expenses_cents: 0,
                pricing_adjustments_cents: 0,
                language_surcharge_cents: 0,
                leg_total_cents: 15000,
            },
            return_leg: None,
            round_trip_discount_percent: 0.0,
            round_trip_discount_cents: 0,
            additional_items_total_cents: 0,
            total_price_cents: 15000,
            currency: "BRL".to_string(),
            payment_intent_id: None,
            refund: None,
            quote_request_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn payment_confirmation_confirms_booking() {
        let mut b = booking();
        let applied = BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        assert!(applied);
        assert_eq!(b.payment_status, PaymentStatus::Pago);
        assert_eq!(b.status, BookingStatus::Confirmada);
        assert_eq!(b.payment_intent_id.as_deref(), Some("pi_123"));
    }

    #[test]
    fn replayed_confirmation_is_a_no_op() {
        let mut b = booking();
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        let updated_at = b.updated_at;

        let applied = BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        assert!(!applied);
        assert_eq!(b.payment_status, PaymentStatus::Pago);
        assert_eq!(b.updated_at, updated_at);
    }

    #[test]
    fn confirmation_with_different_intent_is_rejected() {
        let mut b = booking();
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        let err = BookingLifecycle::confirm_payment(&mut b, "pi_999").unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
    }

    #[test]
    fn refund_requires_paid_status() {
        let mut b = booking();
        let err = BookingLifecycle::refund(&mut b, "re_1", "cliente desistiu").unwrap_err();
        assert!(matches!(err, EngineError::RefundNotAllowed(_)));
        assert_eq!(b.payment_status, PaymentStatus::Aguardando);
    }

    #[test]
    fn refund_requires_a_reason() {
        let mut b = booking();
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        let err = BookingLifecycle::refund(&mut b, "re_1", "   ").unwrap_err();
        assert!(matches!(err, EngineError::RefundNotAllowed(_)));
    }

    #[test]
    fn refund_cancels_and_stamps() {
        let mut b = booking();
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        BookingLifecycle::refund(&mut b, "re_1", "cliente desistiu").unwrap();

        assert_eq!(b.payment_status, PaymentStatus::Reembolsado);
        assert_eq!(b.status, BookingStatus::Cancelada);
        let refund = b.refund.as_ref().unwrap();
        assert_eq!(refund.refund_id, "re_1");
        assert_eq!(refund.refund_reason, "cliente desistiu");
        assert!(b.is_terminal());
    }

    #[test]
    fn double_refund_is_rejected() {
        let mut b = booking();
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        BookingLifecycle::refund(&mut b, "re_1", "motivo").unwrap();
        let err = BookingLifecycle::refund(&mut b, "re_2", "motivo").unwrap_err();
        assert!(matches!(err, EngineError::RefundNotAllowed(_)));
    }

    #[test]
    fn reserved_refund_blocks_a_second_reservation() {
        let mut b = booking();
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        BookingLifecycle::begin_refund(&mut b, "motivo").unwrap();

        // The reservation holds the payment axis; the trip stays as is
        // until the gateway answers.
        assert_eq!(b.payment_status, PaymentStatus::Reembolsado);
        assert_eq!(b.status, BookingStatus::Confirmada);

        let err = BookingLifecycle::begin_refund(&mut b, "outro motivo").unwrap_err();
        assert!(matches!(err, EngineError::RefundNotAllowed(_)));
    }

    #[test]
    fn aborted_refund_restores_paid_and_allows_retry() {
        let mut b = booking();
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        BookingLifecycle::begin_refund(&mut b, "motivo").unwrap();
        BookingLifecycle::abort_refund(&mut b).unwrap();

        assert_eq!(b.payment_status, PaymentStatus::Pago);
        assert_eq!(b.status, BookingStatus::Confirmada);
        assert!(b.refund.is_none());

        BookingLifecycle::refund(&mut b, "re_1", "motivo").unwrap();
        assert_eq!(b.status, BookingStatus::Cancelada);
    }

    #[test]
    fn completed_refund_cannot_be_aborted() {
        let mut b = booking();
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        BookingLifecycle::refund(&mut b, "re_1", "motivo").unwrap();
        let err = BookingLifecycle::abort_refund(&mut b).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
        assert_eq!(b.refund.as_ref().unwrap().refund_id, "re_1");
    }

    #[test]
    fn resend_link_only_while_payable() {
        let mut b = booking();
        assert!(BookingLifecycle::ensure_can_resend_link(&b).is_ok());

        BookingLifecycle::mark_payment_failed(&mut b, "pi_123").unwrap();
        assert!(BookingLifecycle::ensure_can_resend_link(&b).is_ok());

        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        assert!(BookingLifecycle::ensure_can_resend_link(&b).is_err());
    }

    #[test]
    fn resend_link_blocked_on_cancelled_booking() {
        let mut b = booking();
        BookingLifecycle::cancel(&mut b).unwrap();
        assert!(BookingLifecycle::ensure_can_resend_link(&b).is_err());
    }

    #[test]
    fn paid_override_requires_intent() {
        let mut b = booking();
        let err =
            BookingLifecycle::override_payment_status(&mut b, PaymentStatus::Pago).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn complete_requires_confirmed() {
        let mut b = booking();
        assert!(BookingLifecycle::complete(&mut b).is_err());
        BookingLifecycle::confirm_payment(&mut b, "pi_123").unwrap();
        BookingLifecycle::complete(&mut b).unwrap();
        assert_eq!(b.status, BookingStatus::Concluida);
        assert!(b.is_terminal());
    }
}
