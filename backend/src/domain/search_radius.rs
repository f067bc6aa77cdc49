//! Search-radius escalation.
//!
//! Radii are tried smallest first. The first radius that yields anything wins
//! and its results are used on their own; results are never merged across
//! radii. When every radius comes back empty the escalation is exhausted.

/// Validated, strictly increasing list of radii in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusSchedule(Vec<f64>);

/// Reasons a radius list is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RadiusScheduleError {
    /// No radii were given.
    #[error("at least one search radius is required")]
    Empty,
    /// A radius is not a positive finite number.
    #[error("search radius {0} must be a positive finite number of degrees")]
    NotPositive(f64),
    /// A radius is not larger than its predecessor.
    #[error("search radii must be strictly increasing")]
    NotIncreasing,
}

impl RadiusSchedule {
    /// Validate `radii`.
    pub fn new(radii: Vec<f64>) -> Result<Self, RadiusScheduleError> {
        if radii.is_empty() {
            return Err(RadiusScheduleError::Empty);
        }
        if let Some(bad) = radii.iter().find(|r| !r.is_finite() || **r <= 0.0) {
            return Err(RadiusScheduleError::NotPositive(*bad));
        }
        if radii.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(RadiusScheduleError::NotIncreasing);
        }
        Ok(Self(radii))
    }

    /// Radii in query order.
    #[must_use]
    pub fn radii(&self) -> &[f64] {
        &self.0
    }
}

impl Default for RadiusSchedule {
    fn default() -> Self {
        Self(vec![0.02, 0.05, 0.1])
    }
}

/// Escalation state.
#[derive(Debug, Clone, PartialEq)]
pub enum EscalationState<T> {
    /// Waiting for the results of the radius at this index.
    Trying {
        /// Position in the schedule.
        index: usize,
        /// Radius in degrees.
        radius: f64,
    },
    /// A radius produced results.
    Found {
        /// Winning radius in degrees.
        radius: f64,
        /// Results from that radius only.
        results: Vec<T>,
    },
    /// Every radius came back empty.
    Exhausted,
}

/// State machine walking a [`RadiusSchedule`].
///
/// # Examples
/// ```
/// use nearby::domain::{EscalationState, RadiusEscalation, RadiusSchedule};
///
/// let schedule = RadiusSchedule::default();
/// let mut escalation = RadiusEscalation::new(&schedule);
/// escalation.record(Vec::<u8>::new());
/// escalation.record(vec![1, 2]);
/// assert_eq!(
///     escalation.into_state(),
///     EscalationState::Found { radius: 0.05, results: vec![1, 2] }
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RadiusEscalation<'a, T> {
    radii: &'a [f64],
    state: EscalationState<T>,
}

impl<'a, T> RadiusEscalation<'a, T> {
    /// Start at the smallest radius.
    #[must_use]
    pub fn new(schedule: &'a RadiusSchedule) -> Self {
        let radii = schedule.radii();
        let state = radii
            .first()
            .map_or(EscalationState::Exhausted, |&radius| EscalationState::Trying {
                index: 0,
                radius,
            });
        Self { radii, state }
    }

    /// Radius awaiting results, if the escalation is still running.
    #[must_use]
    pub fn pending_radius(&self) -> Option<f64> {
        match self.state {
            EscalationState::Trying { radius, .. } => Some(radius),
            EscalationState::Found { .. } | EscalationState::Exhausted => None,
        }
    }

    /// Record the results for the pending radius.
    ///
    /// Non-empty results finish the escalation; empty ones advance to the
    /// next radius or exhaust it. Calls after completion are ignored.
    pub fn record(&mut self, results: Vec<T>) {
        let EscalationState::Trying { index, radius } = self.state else {
            return;
        };
        self.state = if !results.is_empty() {
            EscalationState::Found { radius, results }
        } else {
            let next = index + 1;
            self.radii
                .get(next)
                .map_or(EscalationState::Exhausted, |&radius| EscalationState::Trying {
                    index: next,
                    radius,
                })
        };
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &EscalationState<T> {
        &self.state
    }

    /// Consume the escalation, returning its final state.
    #[must_use]
    pub fn into_state(self) -> EscalationState<T> {
        self.state
    }
}
