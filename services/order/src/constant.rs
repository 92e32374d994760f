use crate::WebApiHdlrLabel;

pub mod app_meta {
    // TODO, machine code to UUID generator should be configurable
    pub const MACHINE_CODE: u8 = 1;
}

pub mod hard_limit {
    pub const MAX_ITEMS_STORED_PER_MODEL: u32 = 2200u32;
    pub const MAX_DB_CONNECTIONS: u32 = 10000u32;
    pub const MAX_SECONDS_DB_IDLE: u16 = 600u16;
    pub const MAX_ITEMS_PER_ORDER: usize = 128;
    // cap of client amounts, below the widest amount the order tables
    // store with delivery fee included, in (mantissa, scale)
    pub const MAX_ORDER_AMOUNT: (i64, u32) = (9_999_900_000, 2);
    pub const MAX_SECONDS_NOTIFY: u64 = 15;
}

/// business rules applied when admitting new orders
pub mod admission {
    // fee and discount ratio, in (mantissa, scale) of decimal number
    pub const DELIVERY_FEE: (i64, u32) = (150, 2);
    pub const FIRST_ORDER_DISCOUNT_RATIO: (i64, u32) = (10, 2);

    pub const MIN_LEAD_MINUTES: i64 = 20;
    pub const MIN_PHONE_LENGTH: usize = 5;

    pub const REGEX_POSTAL_CODE: &str = r"^\d{5}$";
    pub const SERVED_POSTAL_CODES: [&str; 6] = ["00174", "00175", "00173", "00172", "00178", "00169"];

    // evening ladder, used whenever the slot table is empty or unreachable
    pub const DEFAULT_SLOT_LADDER: [&str; 10] = [
        "19:00", "19:20", "19:40", "20:00", "20:20", "20:40", "21:00", "21:20", "21:40", "22:00",
    ];

    pub const MODE_DELIVERY: &str = "delivery";
    pub const MODE_PICKUP: &str = "pickup";
}

pub(crate) mod api {
    use super::WebApiHdlrLabel;

    #[allow(non_camel_case_types)]
    pub(crate) struct web {}

    impl web {
        pub(crate) const CREATE_NEW_ORDER: WebApiHdlrLabel = "create_new_order";
        pub(crate) const LIST_SLOT_AVAILABILITY: WebApiHdlrLabel = "list_slot_availability";
        pub(crate) const RETRIEVE_ORDER_HISTORY: WebApiHdlrLabel = "retrieve_order_history";
        pub(crate) const HEALTH_CHECK: WebApiHdlrLabel = "health_check";
    }
}

pub(crate) const HTTP_CONTENT_TYPE_JSON: &str = "application/json";
