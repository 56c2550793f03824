//! Entity models.

mod attachment;
mod channel;
mod emoji;
mod guild;
mod member;
mod message;
mod role;
mod user;
mod voice_state;

pub use attachment::Attachment;
pub use channel::{Channel, ChannelKind};
pub use emoji::Emoji;
pub use guild::Guild;
pub use member::Member;
pub use message::Message;
pub use role::Role;
pub use user::{NO_DISCRIMINATOR, User};
pub use voice_state::VoiceState;
