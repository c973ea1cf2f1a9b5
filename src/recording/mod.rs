pub mod clock;
pub mod debounce;
pub mod mutation;
pub mod network;
pub mod recorder;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mutation::MutationWatcher;
pub use network::{NetworkMonitor, NetworkPrimitive, NetworkResult, PageNetwork};
pub use recorder::{Recorder, StepCallback, StepEdit};
