use axum::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::bookings::{Addon, Booking, BookingStatus, NewBooking, PaymentStatus};
use crate::inventory::{
    BedConfig, BookingChannel, CancellationPolicy, CreateCancellationPolicy, CreateMealPlan,
    CreateRoomType, IncludedMeal, MealPlan, OccupancyFloor, RoomType, RoomUnit,
};
use crate::stay::StayRange;
use crate::store::{HotelStore, StoreError, StoreResult};

const ROOM_TYPE_COLUMNS: &str = "id, name, description, base_rate, max_occupancy, \
     bed_configuration, occupancy_floors, is_active, created_at, updated_at";

const ROOM_UNIT_COLUMNS: &str = "id, room_type_id, label, in_service, created_at";

const MEAL_PLAN_COLUMNS: &str = "code, name, included_meals, channels, is_active, sort_order";

const POLICY_COLUMNS: &str = "code, name, terms, refundable_until_days, adjustment_kind, \
     adjustment_value, channels, is_active, sort_order";

const BOOKING_COLUMNS: &str = "id, room_type_id, room_unit_id, check_in, check_out, \
     guests_count, channel, meal_plan_code, cancellation_policy_code, guest_name, guest_email, \
     guest_phone, room_rate, meal_cost, policy_adjustment, gst_rate, gst_amount, addon_total, \
     total_amount, addons, status, payment_status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct RoomTypeRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    base_rate: Decimal,
    max_occupancy: i32,
    bed_configuration: Json<Vec<BedConfig>>,
    occupancy_floors: Json<Vec<OccupancyFloor>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoomTypeRow> for RoomType {
    fn from(row: RoomTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            base_rate: row.base_rate,
            max_occupancy: row.max_occupancy,
            bed_configuration: row.bed_configuration.0,
            occupancy_floors: row.occupancy_floors.0,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn parse_channels(raw: Vec<String>) -> StoreResult<Vec<BookingChannel>> {
    raw.iter()
        .map(|channel| channel.parse().map_err(StoreError::Corrupt))
        .collect()
}

fn channel_names(channels: &[BookingChannel]) -> Vec<String> {
    channels.iter().map(|c| c.as_str().to_string()).collect()
}

#[derive(sqlx::FromRow)]
struct MealPlanRow {
    code: String,
    name: String,
    included_meals: Json<Vec<IncludedMeal>>,
    channels: Vec<String>,
    is_active: bool,
    sort_order: i32,
}

impl TryFrom<MealPlanRow> for MealPlan {
    type Error = StoreError;

    fn try_from(row: MealPlanRow) -> StoreResult<Self> {
        Ok(Self {
            code: row.code,
            name: row.name,
            included_meals: row.included_meals.0,
            channels: parse_channels(row.channels)?,
            is_active: row.is_active,
            sort_order: row.sort_order,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PolicyRow {
    code: String,
    name: String,
    terms: String,
    refundable_until_days: Option<i32>,
    adjustment_kind: String,
    adjustment_value: Decimal,
    channels: Vec<String>,
    is_active: bool,
    sort_order: i32,
}

impl TryFrom<PolicyRow> for CancellationPolicy {
    type Error = StoreError;

    fn try_from(row: PolicyRow) -> StoreResult<Self> {
        Ok(Self {
            code: row.code,
            name: row.name,
            terms: row.terms,
            refundable_until_days: row.refundable_until_days,
            adjustment_kind: row.adjustment_kind.parse().map_err(StoreError::Corrupt)?,
            adjustment_value: row.adjustment_value,
            channels: parse_channels(row.channels)?,
            is_active: row.is_active,
            sort_order: row.sort_order,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    room_type_id: Uuid,
    room_unit_id: Option<Uuid>,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests_count: i32,
    channel: String,
    meal_plan_code: String,
    cancellation_policy_code: String,
    guest_name: String,
    guest_email: String,
    guest_phone: Option<String>,
    room_rate: Decimal,
    meal_cost: Decimal,
    policy_adjustment: Decimal,
    gst_rate: Decimal,
    gst_amount: Decimal,
    addon_total: Decimal,
    total_amount: Decimal,
    addons: Json<Vec<Addon>>,
    status: BookingStatus,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            room_type_id: row.room_type_id,
            room_unit_id: row.room_unit_id,
            check_in: row.check_in,
            check_out: row.check_out,
            guests_count: row.guests_count,
            channel: row.channel.parse().map_err(StoreError::Corrupt)?,
            meal_plan_code: row.meal_plan_code,
            cancellation_policy_code: row.cancellation_policy_code,
            guest_name: row.guest_name,
            guest_email: row.guest_email,
            guest_phone: row.guest_phone,
            room_rate: row.room_rate,
            meal_cost: row.meal_cost,
            policy_adjustment: row.policy_adjustment,
            gst_rate: row.gst_rate,
            gst_amount: row.gst_amount,
            addon_total: row.addon_total,
            total_amount: row.total_amount,
            addons: row.addons.0,
            status: row.status,
            payment_status: row.payment_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgHotelStore {
    pool: PgPool,
}

impl PgHotelStore {
    /// Create a new PgHotelStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HotelStore for PgHotelStore {
    async fn insert_room_type(&self, request: &CreateRoomType) -> StoreResult<RoomType> {
        let row = sqlx::query_as::<_, RoomTypeRow>(&format!(
            r#"
            INSERT INTO room_types (name, description, base_rate, max_occupancy, bed_configuration, occupancy_floors)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            ROOM_TYPE_COLUMNS
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.base_rate)
        .bind(request.max_occupancy)
        .bind(Json(&request.bed_configuration))
        .bind(Json(&request.occupancy_floors))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_room_type(&self, id: Uuid) -> StoreResult<Option<RoomType>> {
        let row = sqlx::query_as::<_, RoomTypeRow>(&format!(
            "SELECT {} FROM room_types WHERE id = $1",
            ROOM_TYPE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RoomType::from))
    }

    async fn list_room_types(&self) -> StoreResult<Vec<RoomType>> {
        let rows = sqlx::query_as::<_, RoomTypeRow>(&format!(
            "SELECT {} FROM room_types ORDER BY name",
            ROOM_TYPE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoomType::from).collect())
    }

    async fn insert_room_unit(&self, room_type_id: Uuid, label: &str) -> StoreResult<RoomUnit> {
        let unit = sqlx::query_as::<_, RoomUnit>(&format!(
            r#"
            INSERT INTO room_units (room_type_id, label)
            VALUES ($1, $2)
            RETURNING {}
            "#,
            ROOM_UNIT_COLUMNS
        ))
        .bind(room_type_id)
        .bind(label)
        .fetch_one(&self.pool)
        .await?;

        Ok(unit)
    }

    async fn list_room_units(&self, room_type_id: Uuid) -> StoreResult<Vec<RoomUnit>> {
        let units = sqlx::query_as::<_, RoomUnit>(&format!(
            "SELECT {} FROM room_units WHERE room_type_id = $1 ORDER BY label",
            ROOM_UNIT_COLUMNS
        ))
        .bind(room_type_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    async fn set_unit_in_service(&self, unit_id: Uuid, in_service: bool) -> StoreResult<Option<RoomUnit>> {
        let unit = sqlx::query_as::<_, RoomUnit>(&format!(
            "UPDATE room_units SET in_service = $1 WHERE id = $2 RETURNING {}",
            ROOM_UNIT_COLUMNS
        ))
        .bind(in_service)
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(unit)
    }

    async fn insert_meal_plan(&self, request: &CreateMealPlan) -> StoreResult<MealPlan> {
        let row = sqlx::query_as::<_, MealPlanRow>(&format!(
            r#"
            INSERT INTO meal_plans (code, name, included_meals, channels, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            MEAL_PLAN_COLUMNS
        ))
        .bind(&request.code)
        .bind(&request.name)
        .bind(Json(&request.included_meals))
        .bind(channel_names(&request.channels))
        .bind(request.is_active)
        .bind(request.sort_order)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_meal_plans(&self) -> StoreResult<Vec<MealPlan>> {
        let rows = sqlx::query_as::<_, MealPlanRow>(&format!(
            "SELECT {} FROM meal_plans ORDER BY sort_order, code",
            MEAL_PLAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MealPlan::try_from).collect()
    }

    async fn insert_cancellation_policy(
        &self,
        request: &CreateCancellationPolicy,
    ) -> StoreResult<CancellationPolicy> {
        let row = sqlx::query_as::<_, PolicyRow>(&format!(
            r#"
            INSERT INTO cancellation_policies
                (code, name, terms, refundable_until_days, adjustment_kind, adjustment_value, channels, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            POLICY_COLUMNS
        ))
        .bind(&request.code)
        .bind(&request.name)
        .bind(&request.terms)
        .bind(request.refundable_until_days)
        .bind(request.adjustment_kind.as_str())
        .bind(request.adjustment_value)
        .bind(channel_names(&request.channels))
        .bind(request.is_active)
        .bind(request.sort_order)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_cancellation_policies(&self) -> StoreResult<Vec<CancellationPolicy>> {
        let rows = sqlx::query_as::<_, PolicyRow>(&format!(
            "SELECT {} FROM cancellation_policies ORDER BY sort_order, code",
            POLICY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CancellationPolicy::try_from).collect()
    }

    async fn insert_booking(&self, booking: &NewBooking) -> StoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (
                room_type_id, check_in, check_out, guests_count, channel, meal_plan_code,
                cancellation_policy_code, guest_name, guest_email, guest_phone, room_rate,
                meal_cost, policy_adjustment, gst_rate, gst_amount, addon_total, total_amount,
                addons, status, payment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking.room_type_id)
        .bind(booking.stay.check_in)
        .bind(booking.stay.check_out)
        .bind(booking.guests_count)
        .bind(booking.channel.as_str())
        .bind(&booking.meal_plan_code)
        .bind(&booking.cancellation_policy_code)
        .bind(&booking.guest_name)
        .bind(&booking.guest_email)
        .bind(&booking.guest_phone)
        .bind(booking.room_rate)
        .bind(booking.meal_cost)
        .bind(booking.policy_adjustment)
        .bind(booking.gst_rate)
        .bind(booking.gst_amount)
        .bind(booking.addon_total)
        .bind(booking.total_amount)
        .bind(Json(&booking.addons))
        .bind(BookingStatus::Pending)
        .bind(PaymentStatus::Unpaid)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn overlapping_bookings(
        &self,
        room_type_id: Uuid,
        stay: &StayRange,
        exclude_booking_id: Option<Uuid>,
    ) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE room_type_id = $1
              AND room_unit_id IS NOT NULL
              AND status <> 'cancelled'
              AND check_in < $3
              AND $2 < check_out
              AND ($4::uuid IS NULL OR id <> $4)
            ORDER BY check_in, id
            "#,
            BOOKING_COLUMNS
        ))
        .bind(room_type_id)
        .bind(stay.check_in)
        .bind(stay.check_out)
        .bind(exclude_booking_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn assign_unit(
        &self,
        booking_id: Uuid,
        room_type_id: Uuid,
        candidates: &[Uuid],
    ) -> StoreResult<Option<Booking>> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(booking) = booking else {
            return Ok(None);
        };

        for unit_id in candidates {
            // Row lock serializes concurrent assigners of the same unit
            let locked: Option<Uuid> = sqlx::query_scalar(
                r#"
                SELECT id FROM room_units
                WHERE id = $1 AND room_type_id = $2 AND in_service
                FOR UPDATE
                "#,
            )
            .bind(unit_id)
            .bind(room_type_id)
            .fetch_optional(&mut *tx)
            .await?;

            if locked.is_none() {
                continue;
            }

            let taken: bool = sqlx::query_scalar(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM bookings
                    WHERE room_unit_id = $1
                      AND id <> $2
                      AND status <> 'cancelled'
                      AND check_in < $4
                      AND $3 < check_out
                )
                "#,
            )
            .bind(unit_id)
            .bind(booking_id)
            .bind(booking.check_in)
            .bind(booking.check_out)
            .fetch_one(&mut *tx)
            .await?;

            if taken {
                tracing::debug!("Unit {} was taken before booking {} could claim it", unit_id, booking_id);
                continue;
            }

            let updated = sqlx::query_as::<_, BookingRow>(&format!(
                r#"
                UPDATE bookings
                SET room_unit_id = $1, room_type_id = $2, updated_at = NOW()
                WHERE id = $3
                RETURNING {}
                "#,
                BOOKING_COLUMNS
            ))
            .bind(unit_id)
            .bind(room_type_id)
            .bind(booking_id)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            return Booking::try_from(updated).map(Some);
        }

        tx.rollback().await?;
        Ok(None)
    }

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET payment_status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }
}
