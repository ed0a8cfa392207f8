use crate::bookings::{BookingStatus, PaymentStatus};

/// Rules for booking status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a booking status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Confirmed, Waitlisted, Cancelled
    /// - Confirmed → CheckedIn, Cancelled
    /// - CheckedIn → CheckedOut
    /// - Waitlisted → Pending, Cancelled
    /// - CheckedOut, Cancelled → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: BookingStatus, to: BookingStatus) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Waitlisted)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::CheckedIn)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::CheckedIn, BookingStatus::CheckedOut)
                | (BookingStatus::Waitlisted, BookingStatus::Pending)
                | (BookingStatus::Waitlisted, BookingStatus::Cancelled)
        )
    }

    /// Attempt to transition from one status to another
    pub fn transition(from: BookingStatus, to: BookingStatus) -> Result<BookingStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid status transition from {} to {}", from, to))
        }
    }
}

/// Rules for payment status transitions
pub struct PaymentMachine;

impl PaymentMachine {
    /// Check if a payment status transition is valid
    ///
    /// # Valid Transitions
    /// - Unpaid → Paid
    /// - Paid → Refunded
    /// - Refunded → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: PaymentStatus, to: PaymentStatus) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (PaymentStatus::Unpaid, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }

    /// Attempt to transition from one payment status to another
    pub fn transition(from: PaymentStatus, to: PaymentStatus) -> Result<PaymentStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid payment transition from {} to {}", from, to))
        }
    }
}
