mod admit_order;
mod order_history;
mod slot_availability;

pub use admit_order::{AdmitOrderUsKsErr, AdmitOrderUseCase};
pub use order_history::{OrderHistoryUsKsErr, OrderHistoryUseCase};
pub use slot_availability::SlotAvailabilityUseCase;
