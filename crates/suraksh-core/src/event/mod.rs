//! Cross-component event bus and the domain events carried on it.

mod bus;
mod events;

pub use bus::{BusEvent, DomainEvent, EventBus, Subscription};
pub use events::GraphDataUpdated;
