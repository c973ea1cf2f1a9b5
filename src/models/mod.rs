pub mod action;
pub mod events;
pub mod network;
pub mod session;
pub mod step;

pub use action::*;
pub use events::*;
pub use network::*;
pub use session::*;
pub use step::*;
