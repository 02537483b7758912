//! Simulation clock and component name used by logging.

/// Clock and name of a simulated component.
pub struct SimulationContext {
    name: String,
    time: f64,
}

impl SimulationContext {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            time: 0.,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Moves the clock forward to `time`.
    ///
    /// Panics if `time` lies in the past.
    pub fn advance(&mut self, time: f64) {
        assert!(
            time >= self.time,
            "time goes backwards: {:.3} -> {:.3}",
            self.time,
            time
        );
        self.time = time;
    }
}
