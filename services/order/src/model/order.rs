use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;

use crate::api::web::dto::{ItemExtraReqDto, OrderCreateReqData, OrderItemReqDto};
use crate::constant::admission::{
    MIN_PHONE_LENGTH, MODE_DELIVERY, MODE_PICKUP, REGEX_POSTAL_CODE, SERVED_POSTAL_CODES,
};
use crate::constant::hard_limit::{MAX_ITEMS_PER_ORDER, MAX_ORDER_AMOUNT};
use crate::generate_custom_uid;

use super::charge::{amount_from_wire, OrderChargeModel};
use super::slot::TimeSlotModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillmentMode {
    Delivery,
    Pickup,
}

impl FulfillmentMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivery => MODE_DELIVERY,
            Self::Pickup => MODE_PICKUP,
        }
    }
}

impl FromStr for FulfillmentMode {
    type Err = OrderValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MODE_DELIVERY => Ok(Self::Delivery),
            MODE_PICKUP => Ok(Self::Pickup),
            _others => Err(OrderValidationError::InvalidMode),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerModel {
    // account reference, anonymous customers have none
    pub account_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryAddressModel {
    pub address: String,
    pub postal_code: String,
    pub staircase: Option<String>,
    pub floor: Option<String>,
    pub buzzer: String,
}

/// mode-specific part of an order, fields of one mode are never reachable
/// from the other
#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentModel {
    Delivery {
        address: DeliveryAddressModel,
        slot: TimeSlotModel,
    },
    Pickup {
        pickup_name: String,
        slot: TimeSlotModel,
    },
}

impl FulfillmentModel {
    pub fn mode(&self) -> FulfillmentMode {
        match self {
            Self::Delivery { .. } => FulfillmentMode::Delivery,
            Self::Pickup { .. } => FulfillmentMode::Pickup,
        }
    }
    pub fn slot(&self) -> TimeSlotModel {
        match self {
            Self::Delivery { slot, .. } | Self::Pickup { slot, .. } => *slot,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemExtraModel {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemModel {
    pub product_id: String,
    pub product_name: String,
    pub size: Option<String>,
    pub quantity: u32,
    pub extras: Vec<ItemExtraModel>,
    // extras included, trusted as submitted
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    EmptyItems,
    TooManyItems(usize),
    InvalidMode,
    InvalidPhone,
    MissingDeliveryFields,
    MissingPaymentMethod,
    PostalCodeNotServed,
    MissingPickupFields,
    InvalidTimeSlot(String),
    InvalidItemQuantity(usize),
    InvalidSubtotal,
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyItems => write!(f, "Your cart is empty"),
            Self::TooManyItems(n) => {
                write!(f, "Too many items in one order: {n}, limit: {MAX_ITEMS_PER_ORDER}")
            }
            Self::InvalidMode => write!(f, "Invalid order mode, choose delivery or pickup"),
            Self::InvalidPhone => write!(f, "Invalid phone number"),
            Self::MissingDeliveryFields => write!(
                f,
                "Missing delivery details: address, postal code, buzzer and delivery time are required"
            ),
            Self::MissingPaymentMethod => write!(f, "Missing payment method"),
            Self::PostalCodeNotServed => write!(
                f,
                "Sorry, our riders cannot reach your area. You can still pick up your order at the restaurant"
            ),
            Self::MissingPickupFields => write!(
                f,
                "Missing pickup details: name and pickup time are required"
            ),
            Self::InvalidTimeSlot(raw) => write!(f, "Invalid time slot: {raw}"),
            Self::InvalidItemQuantity(idx) => {
                write!(f, "Invalid quantity of the item at position {idx}")
            }
            Self::InvalidSubtotal => write!(f, "Invalid subtotal"),
        }
    }
}

/// validated order submission, ready for pricing
#[derive(Debug, Clone)]
pub struct OrderRequestModel {
    pub customer: CustomerModel,
    pub fulfillment: FulfillmentModel,
    pub payment_method: Option<String>,
    pub rider_notes: Option<String>,
    pub raw_subtotal: Decimal,
    pub items: Vec<OrderItemModel>,
}

/// trimmed non-blank text, or nothing
fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_slot(raw: String) -> Result<TimeSlotModel, OrderValidationError> {
    TimeSlotModel::from_str(raw.as_str()).map_err(|_e| OrderValidationError::InvalidTimeSlot(raw))
}

fn postal_code_served(code: &str) -> bool {
    let shape_ok = match Regex::new(REGEX_POSTAL_CODE) {
        Ok(re) => re.is_match(code),
        Err(_e) => false,
    };
    shape_ok && SERVED_POSTAL_CODES.contains(&code)
}

impl From<ItemExtraReqDto> for ItemExtraModel {
    fn from(value: ItemExtraReqDto) -> Self {
        Self {
            name: value.name.unwrap_or_default(),
            price: amount_from_wire(value.price.as_ref()),
        }
    }
}

impl From<OrderItemReqDto> for OrderItemModel {
    fn from(value: OrderItemReqDto) -> Self {
        let extras = value
            .extras
            .unwrap_or_default()
            .into_iter()
            .map(ItemExtraModel::from)
            .collect();
        Self {
            product_id: value.product_id.map(String::from).unwrap_or_default(),
            product_name: value.product_name.unwrap_or_default(),
            size: non_blank(value.size),
            quantity: value.quantity.unwrap_or(1),
            extras,
            unit_price: amount_from_wire(value.unit_price.as_ref()),
            total_price: amount_from_wire(value.total_price.as_ref()),
        }
    }
}

impl TryFrom<OrderCreateReqData> for OrderRequestModel {
    type Error = OrderValidationError;

    // rules are evaluated in fixed order, the first failure is reported
    fn try_from(value: OrderCreateReqData) -> Result<Self, Self::Error> {
        let items = value.items.unwrap_or_default();
        if items.is_empty() {
            return Err(OrderValidationError::EmptyItems);
        } else if items.len() > MAX_ITEMS_PER_ORDER {
            return Err(OrderValidationError::TooManyItems(items.len()));
        }
        let mode = FulfillmentMode::from_str(value.mode.as_deref().unwrap_or("").trim())?;
        let phone = non_blank(value.phone.map(String::from))
            .filter(|p| p.chars().count() >= MIN_PHONE_LENGTH)
            .ok_or(OrderValidationError::InvalidPhone)?;
        let payment_method = non_blank(value.payment_method);

        let fulfillment = match mode {
            FulfillmentMode::Delivery => {
                let required = (
                    non_blank(value.address),
                    non_blank(value.postal_code.map(String::from)),
                    non_blank(value.buzzer),
                    non_blank(value.delivery_time),
                );
                let (address, postal_code, buzzer, raw_slot) =
                    if let (Some(a), Some(p), Some(b), Some(t)) = required {
                        (a, p, b, t)
                    } else {
                        return Err(OrderValidationError::MissingDeliveryFields);
                    };
                if payment_method.is_none() {
                    return Err(OrderValidationError::MissingPaymentMethod);
                }
                if !postal_code_served(postal_code.as_str()) {
                    return Err(OrderValidationError::PostalCodeNotServed);
                }
                let slot = parse_slot(raw_slot)?;
                let address = DeliveryAddressModel {
                    address,
                    postal_code,
                    staircase: non_blank(value.staircase),
                    floor: non_blank(value.floor),
                    buzzer,
                };
                FulfillmentModel::Delivery { address, slot }
            }
            FulfillmentMode::Pickup => {
                let required = (non_blank(value.pickup_name), non_blank(value.pickup_time));
                let (pickup_name, raw_slot) = if let (Some(n), Some(t)) = required {
                    (n, t)
                } else {
                    return Err(OrderValidationError::MissingPickupFields);
                };
                let slot = parse_slot(raw_slot)?;
                FulfillmentModel::Pickup { pickup_name, slot }
            }
        };

        let items = items
            .into_iter()
            .map(OrderItemModel::from)
            .collect::<Vec<_>>();
        if let Some(idx) = items.iter().position(|m| m.quantity == 0) {
            return Err(OrderValidationError::InvalidItemQuantity(idx));
        }
        let raw_subtotal = amount_from_wire(value.subtotal.as_ref());
        if raw_subtotal.abs() > Decimal::new(MAX_ORDER_AMOUNT.0, MAX_ORDER_AMOUNT.1) {
            return Err(OrderValidationError::InvalidSubtotal);
        }
        let customer = CustomerModel {
            account_id: non_blank(value.user_id.map(String::from)),
            first_name: non_blank(value.user_first_name),
            last_name: non_blank(value.user_last_name),
            email: non_blank(value.user_email),
            phone,
        };
        Ok(Self {
            customer,
            fulfillment,
            payment_method,
            rider_notes: non_blank(value.rider_notes),
            raw_subtotal,
            items,
        })
    } // end of fn try_from
} // end of impl OrderRequestModel

#[derive(Debug, Clone, PartialEq)]
pub struct OrderModel {
    pub id: String,
    pub created_at: DateTime<FixedOffset>,
    // calendar day on which the slot is claimed
    pub order_date: NaiveDate,
    pub customer: CustomerModel,
    pub fulfillment: FulfillmentModel,
    pub payment_method: Option<String>,
    pub rider_notes: Option<String>,
    pub charge: OrderChargeModel,
}

impl OrderModel {
    pub fn generate_id(machine_code: u8) -> String {
        let oid = generate_custom_uid(machine_code);
        oid.as_simple().to_string()
    }

    pub fn new(
        req: OrderRequestModel,
        charge: OrderChargeModel,
        now: DateTime<FixedOffset>,
        machine_code: u8,
    ) -> (Self, Vec<OrderItemModel>) {
        let OrderRequestModel {
            customer,
            fulfillment,
            payment_method,
            rider_notes,
            raw_subtotal: _,
            items,
        } = req;
        let order = Self {
            id: Self::generate_id(machine_code),
            created_at: now,
            order_date: now.date_naive(),
            customer,
            fulfillment,
            payment_method,
            rider_notes,
            charge,
        };
        (order, items)
    }

    pub fn slot(&self) -> TimeSlotModel {
        self.fulfillment.slot()
    }
} // end of impl OrderModel
