pub mod cancel;
pub mod channels;

pub use cancel::CancelToken;
pub use channels::{ui_channel, UiEvent, UiSender};
