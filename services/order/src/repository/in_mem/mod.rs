pub(super) mod order;
pub(super) mod time_slot;
