pub mod directory;
pub mod error;
pub mod traits;
pub mod types;

pub use directory::StaticDirectory;
pub use error::ChatCmdError;
pub use traits::{ChannelActions, Directory};
pub use types::{ChannelRef, MessageContext, UserRef};
