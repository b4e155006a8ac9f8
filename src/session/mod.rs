pub mod dispatcher;
pub mod events;

pub use dispatcher::SessionDispatcher;
pub use events::{ConnectionState, ConnectionStatus, EmotionUpdate, InboundMessage, OutboundEvent};
