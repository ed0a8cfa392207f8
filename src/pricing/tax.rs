// GST bracket selection and the guest-facing price breakdown

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bookings::Addon;
use crate::inventory::MealPlan;
use crate::money::{format_inr, round_money, MAX_STORED_AMOUNT};
use crate::pricing::error::PricingError;
use crate::pricing::calculator::RateCalculator;
use crate::pricing::models::{AddonLine, BreakdownLine, PriceBreakdown, RateVariant};

/// GST bracket rule: the standard rate up to and including the per-night
/// threshold, the premium rate above it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstPolicy {
    pub threshold: Decimal,
    pub standard_rate: Decimal,
    pub premium_rate: Decimal,
}

impl Default for GstPolicy {
    fn default() -> Self {
        Self {
            threshold: Decimal::new(7500, 0),
            standard_rate: Decimal::new(5, 2),
            premium_rate: Decimal::new(18, 2),
        }
    }
}

impl GstPolicy {
    /// Rate for a stay, chosen by the per-night room rate
    pub fn rate_for(&self, room_rate: Decimal, nights: i64) -> Decimal {
        let per_night = room_rate / Decimal::from(nights.max(1));
        if per_night <= self.threshold {
            self.standard_rate
        } else {
            self.premium_rate
        }
    }
}

/// Whether add-ons are taxed along with the stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonTaxPolicy {
    /// Add-ons are added after tax, untaxed
    Exempt,
    /// Add-ons are taxed at the stay's bracket rate
    Taxed,
}

impl Default for AddonTaxPolicy {
    fn default() -> Self {
        AddonTaxPolicy::Exempt
    }
}

impl std::str::FromStr for AddonTaxPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exempt" => Ok(AddonTaxPolicy::Exempt),
            "taxed" => Ok(AddonTaxPolicy::Taxed),
            _ => Err(format!("Invalid add-on tax policy: {}", s)),
        }
    }
}

fn percent_label(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::from(100)).normalize())
}

fn line(label: String, amount: Decimal) -> BreakdownLine {
    BreakdownLine {
        display: format_inr(amount),
        label,
        amount,
    }
}

fn too_large() -> PricingError {
    PricingError::ValidationError("Price exceeds the largest amount a booking can hold".to_string())
}

fn storable(amount: Decimal) -> Result<Decimal, PricingError> {
    if amount.abs() > MAX_STORED_AMOUNT {
        return Err(too_large());
    }
    Ok(amount)
}

/// Build the full breakdown for one priced variant
///
/// Taxable subtotal is room + meals + policy adjustment. Add-ons follow
/// `addon_policy`. Every stored total must fit `MAX_STORED_AMOUNT`.
pub fn build_breakdown(
    variant: &RateVariant,
    plan: &MealPlan,
    guests: i32,
    addons: &[Addon],
    gst: &GstPolicy,
    addon_policy: AddonTaxPolicy,
) -> Result<PriceBreakdown, PricingError> {
    let nights = variant.nights;
    let meal_lines = RateCalculator::meal_lines(plan, guests, nights);
    let taxable_subtotal = storable(variant.total_price)?;
    let gst_rate = gst.rate_for(variant.room_rate, nights);
    let gst_amount = round_money(taxable_subtotal.checked_mul(gst_rate).ok_or_else(too_large)?);

    let addon_lines = addons
        .iter()
        .map(|addon| {
            Ok(AddonLine {
                name: addon.name.clone(),
                quantity: addon.quantity,
                unit_price: addon.unit_price,
                amount: storable(addon.line_total().ok_or_else(too_large)?)?,
            })
        })
        .collect::<Result<Vec<AddonLine>, PricingError>>()?;
    let addon_total = addon_lines
        .iter()
        .try_fold(Decimal::ZERO, |sum, l| sum.checked_add(l.amount))
        .ok_or_else(too_large)?;
    let addon_tax = match addon_policy {
        AddonTaxPolicy::Exempt => Decimal::ZERO,
        AddonTaxPolicy::Taxed => {
            round_money(addon_total.checked_mul(gst_rate).ok_or_else(too_large)?)
        }
    };

    let grand_total = [gst_amount, addon_total, addon_tax]
        .into_iter()
        .try_fold(taxable_subtotal, |sum, amount| sum.checked_add(amount))
        .ok_or_else(too_large)
        .and_then(storable)?;

    let mut lines = vec![line(
        format!("Room ({} night{})", nights, if nights == 1 { "" } else { "s" }),
        variant.room_rate,
    )];
    for meal in &meal_lines {
        lines.push(line(
            format!("{} ({} guests x {} nights)", meal.category.label(), meal.guests, meal.nights),
            meal.amount,
        ));
    }
    if !variant.policy_adjustment.is_zero() {
        lines.push(line(
            format!("Cancellation policy: {}", variant.cancellation_policy_name),
            variant.policy_adjustment,
        ));
    }
    let bracket_note = if gst_rate == gst.standard_rate {
        format!("per-night rate up to {}", format_inr(gst.threshold))
    } else {
        format!("per-night rate above {}", format_inr(gst.threshold))
    };
    lines.push(line(format!("GST {} ({})", percent_label(gst_rate), bracket_note), gst_amount));
    for addon in &addon_lines {
        lines.push(line(format!("{} x {}", addon.name, addon.quantity), addon.amount));
    }
    if !addon_tax.is_zero() {
        lines.push(line(format!("GST {} on add-ons", percent_label(gst_rate)), addon_tax));
    }
    lines.push(line("Total".to_string(), grand_total));

    Ok(PriceBreakdown {
        meal_plan_code: variant.meal_plan_code.clone(),
        cancellation_policy_code: variant.cancellation_policy_code.clone(),
        nights,
        guests,
        room_subtotal: variant.room_rate,
        meal_subtotal: variant.meal_cost,
        meal_lines,
        policy_adjustment: variant.policy_adjustment,
        taxable_subtotal,
        gst_rate,
        gst_amount,
        addon_lines,
        addon_total,
        addon_tax,
        grand_total,
        lines,
    })
}
