mod charge;
mod notification;
mod order;
mod slot;

pub use charge::{amount_from_wire, round2, OrderChargeModel};
pub use notification::OrderSummaryModel;
pub use order::{
    CustomerModel, DeliveryAddressModel, FulfillmentMode, FulfillmentModel, ItemExtraModel,
    OrderItemModel, OrderModel, OrderRequestModel, OrderValidationError,
};
pub use slot::{SlotAvailabilityModel, SlotCatalogModel, TimeSlotModel};
