pub mod dispatch;
pub mod email;
pub mod messaging;

pub use dispatch::{ChannelDispatcher, ChannelMessage, ChannelSender};
pub use email::EmailSender;
pub use messaging::AlimtalkSender;
