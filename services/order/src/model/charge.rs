use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value as JsnVal;

use super::{FulfillmentMode, OrderValidationError};
use crate::constant::admission::{DELIVERY_FEE, FIRST_ORDER_DISCOUNT_RATIO};

/// round half away from zero to 2 fractional digits
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// money amount sent by client, either JSON number or numeric string,
/// anything else is treated as zero
pub fn amount_from_wire(raw: Option<&JsnVal>) -> Decimal {
    let parse = |s: &str| {
        let s = s.trim();
        Decimal::from_str(s)
            .or_else(|_e| Decimal::from_scientific(s))
            .unwrap_or(Decimal::ZERO)
    };
    match raw {
        Some(JsnVal::Number(n)) => parse(n.to_string().as_str()),
        Some(JsnVal::String(s)) => parse(s.as_str()),
        _others => Decimal::ZERO,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderChargeModel {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub discount: Decimal,
    pub total_paid: Decimal,
}

impl OrderChargeModel {
    pub fn delivery_fee(mode: FulfillmentMode) -> Decimal {
        match mode {
            FulfillmentMode::Delivery => Decimal::new(DELIVERY_FEE.0, DELIVERY_FEE.1),
            FulfillmentMode::Pickup => Decimal::ZERO,
        }
    }

    /// `first_order` means the customer is identified by an account which
    /// has no order stored yet
    pub fn evaluate(
        mode: FulfillmentMode,
        raw_subtotal: Decimal,
        first_order: bool,
    ) -> Result<Self, OrderValidationError> {
        let subtotal = round2(raw_subtotal);
        let delivery_fee = Self::delivery_fee(mode);
        let total = subtotal
            .checked_add(delivery_fee)
            .map(round2)
            .ok_or(OrderValidationError::InvalidSubtotal)?;
        let discount = if first_order {
            let ratio = Decimal::new(FIRST_ORDER_DISCOUNT_RATIO.0, FIRST_ORDER_DISCOUNT_RATIO.1);
            total
                .checked_mul(ratio)
                .map(round2)
                .ok_or(OrderValidationError::InvalidSubtotal)?
        } else {
            Decimal::ZERO
        };
        let total_paid = total
            .checked_sub(discount)
            .map(round2)
            .ok_or(OrderValidationError::InvalidSubtotal)?;
        Ok(Self {
            subtotal,
            delivery_fee,
            total,
            discount,
            total_paid,
        })
    }
}
