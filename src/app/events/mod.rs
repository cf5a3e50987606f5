//! Event-Katalog, EventBus und die Intent/Command-Enums des Controllers.

mod bus;
mod command;
mod event;
mod intent;

pub use bus::{CancellationNotice, CancellationSignal, EventBus, EventStream};
pub use command::AppCommand;
pub use event::{AppEvent, EventKind, EventPayload};
pub use intent::AppIntent;
