mod bus;
mod events;

pub use bus::{EventBus, SubscriptionId};
pub use events::{EditorEvent, EventKind};
