use std::collections::HashSet;

use uuid::Uuid;

use crate::bookings::{AvailabilityReport, Booking, BookingConflict};
use crate::inventory::RoomUnit;
use crate::stay::StayRange;

/// Work out which units of a room type are free for a stay
///
/// A unit is free when it is in service and no non-cancelled booking
/// (other than `exclude_booking_id`) holding it overlaps `stay`. Free unit
/// ids keep the order of `units`, which callers pass sorted by label.
/// Conflicts are only reported when nothing is free.
pub fn free_units(
    units: &[RoomUnit],
    bookings: &[Booking],
    stay: &StayRange,
    exclude_booking_id: Option<Uuid>,
) -> AvailabilityReport {
    let blocking: Vec<&Booking> = bookings
        .iter()
        .filter(|b| Some(b.id) != exclude_booking_id)
        .filter(|b| b.status.holds_unit())
        .filter(|b| b.stay().overlaps(stay))
        .collect();

    let held: HashSet<Uuid> = blocking.iter().filter_map(|b| b.room_unit_id).collect();

    let available_unit_ids: Vec<Uuid> = units
        .iter()
        .filter(|unit| unit.in_service && !held.contains(&unit.id))
        .map(|unit| unit.id)
        .collect();

    let is_valid = !available_unit_ids.is_empty();
    let conflicting_bookings = if is_valid {
        Vec::new()
    } else {
        blocking
            .iter()
            .filter(|b| b.room_unit_id.is_some())
            .map(|b| BookingConflict::from(*b))
            .collect()
    };

    AvailabilityReport {
        is_valid,
        available_unit_ids,
        conflicting_bookings,
        suggested_waitlist: !is_valid,
    }
}

/// Whether one specific unit is free for the stay
pub fn unit_is_free(
    unit_id: Uuid,
    units: &[RoomUnit],
    bookings: &[Booking],
    stay: &StayRange,
) -> bool {
    free_units(units, bookings, stay, None)
        .available_unit_ids
        .contains(&unit_id)
}
