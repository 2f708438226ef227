pub mod dispatcher;
pub mod publish;
pub mod throttle;

pub use dispatcher::{StopDispatcher, StopOutcome, StopPublisher, StopRequest};
pub use publish::{build_stop_event, RelayStopPublisher};
pub use throttle::StopThrottle;
