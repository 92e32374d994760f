use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Number as JsnNum, Value as JsnVal};

/// identifiers sent by clients are either JSON numbers or strings
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum StrOrNumDto {
    Num(JsnNum),
    Text(String),
}

impl From<StrOrNumDto> for String {
    fn from(value: StrOrNumDto) -> String {
        match value {
            StrOrNumDto::Num(n) => n.to_string(),
            StrOrNumDto::Text(s) => s,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ItemExtraReqDto {
    pub id: Option<StrOrNumDto>,
    pub name: Option<String>,
    pub price: Option<JsnVal>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrderItemReqDto {
    pub product_id: Option<StrOrNumDto>,
    pub product_name: Option<String>,
    pub size: Option<String>,
    pub quantity: Option<u32>,
    pub extras: Option<Vec<ItemExtraReqDto>>,
    pub unit_price: Option<JsnVal>,
    pub total_price: Option<JsnVal>,
}

// All fields are optional at wire level, mode-specific requirements are
// checked while converting to the validated order request
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct OrderCreateReqData {
    pub user_id: Option<StrOrNumDto>,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_email: Option<String>,
    pub phone: Option<StrOrNumDto>,
    pub mode: Option<String>,
    pub address: Option<String>,
    #[serde(alias = "cap")]
    pub postal_code: Option<StrOrNumDto>,
    pub staircase: Option<String>,
    pub floor: Option<String>,
    pub buzzer: Option<String>,
    pub delivery_time: Option<String>,
    pub pickup_name: Option<String>,
    pub pickup_time: Option<String>,
    #[serde(alias = "notes_rider")]
    pub rider_notes: Option<String>,
    pub payment_method: Option<String>,
    pub subtotal: Option<JsnVal>,
    // client-computed values, never trusted, the server recomputes them
    pub delivery_fee: Option<JsnVal>,
    pub total: Option<JsnVal>,
    pub items: Option<Vec<OrderItemReqDto>>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderCreateRespOkDto {
    pub ok: bool,
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    pub email_sent: bool,
    pub email_error: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RespErrorDto {
    pub ok: bool,
    pub error: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RespAckDto {
    pub ok: bool,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SlotAvailabilityQueryDto {
    pub mode: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SlotAvailabilityRespDto {
    pub ok: bool,
    pub date: String,
    pub mode: String,
    #[serde(rename = "availableSlots")]
    pub available_slots: Vec<String>,
    #[serde(rename = "bookedSlots")]
    pub booked_slots: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderHistoryQueryDto {
    pub user_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ItemExtraRespDto {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderItemRespDto {
    pub product_id: String,
    pub product_name: String,
    pub size: Option<String>,
    pub quantity: u32,
    pub extras: Vec<ItemExtraRespDto>,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderHistoryEntryDto {
    pub id: String,
    pub created_at: String,
    pub order_date: String,
    pub mode: String,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_email: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub staircase: Option<String>,
    pub floor: Option<String>,
    pub buzzer: Option<String>,
    pub delivery_time: Option<String>,
    pub pickup_name: Option<String>,
    pub pickup_time: Option<String>,
    pub payment_method: Option<String>,
    pub rider_notes: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    pub items: Vec<OrderItemRespDto>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OrderHistoryRespDto {
    pub ok: bool,
    pub orders: Vec<OrderHistoryEntryDto>,
}
