//! Time subsystem.
//!
//! Provides stable, testable simulation timing without coupling to the
//! runtime. Intended usage:
//! - one `SimClock` per engine instance
//! - call `tick(now)` once per presented frame with a monotonically
//!   increasing timestamp in seconds

mod sim_clock;

pub use sim_clock::{ClockSample, SimClock};
