/// Simulation timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockSample {
    /// Accumulated simulation time since start, in seconds.
    ///
    /// Non-decreasing; equals the sum of all clamped `dt` values.
    pub time: f64,

    /// Clamped time elapsed since the previous tick, in seconds.
    pub dt: f64,
}

/// Simulation clock producing `ClockSample` snapshots.
///
/// Timestamps are supplied by the caller (seconds on any monotonic scale)
/// rather than read internally, so tick sequences can be replayed exactly in
/// tests and the clock stays independent of the host scheduler.
///
/// Delta time is clamped to `[0, max_dt]`: the upper bound prevents a
/// simulation assuming small steps from destabilizing after a long stall
/// (a suspended or occluded window resuming), the lower bound rejects
/// timestamps that run backwards.
#[derive(Debug, Clone)]
pub struct SimClock {
    wall: f64,
    time: f64,
    max_dt: f64,
}

impl SimClock {
    /// Largest delta a single tick may contribute, in seconds.
    pub const MAX_DT: f64 = 0.1;

    /// Creates a clock with the wall baseline at zero.
    pub fn new() -> Self {
        Self {
            wall: 0.0,
            time: 0.0,
            max_dt: Self::MAX_DT,
        }
    }

    /// Creates a clock with a custom upper delta clamp.
    pub fn with_max_dt(max_dt: f64) -> Self {
        debug_assert!(max_dt > 0.0);
        Self {
            wall: 0.0,
            time: 0.0,
            max_dt,
        }
    }

    /// Rebaselines the wall timestamp without contributing time.
    ///
    /// Called once when the first frame callback arrives, so the first real
    /// tick measures from the scheduler's own epoch instead of zero.
    pub fn reset(&mut self, now: f64) {
        self.wall = now;
    }

    /// Accumulated simulation time, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advances the clock to `now` and returns a new `ClockSample`.
    pub fn tick(&mut self, now: f64) -> ClockSample {
        let dt = (now - self.wall).clamp(0.0, self.max_dt);
        self.wall = now;
        self.time += dt;

        ClockSample {
            time: self.time,
            dt,
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}
