mod clock;
mod notifier;
mod runner;

pub use clock::{Clock, ManualClock, SystemClock};
pub use notifier::{AlertPattern, Notifier, NullNotifier};
pub use runner::{CadenceToken, SessionRunner, SessionState};
