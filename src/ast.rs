//! Abstract syntax tree for a training session.
//!
//! All nodes are built once by the parser and read-only afterwards;
//! derived fields are computed at construction and never recomputed.

/// A complete training session — ordered steps, source order is
/// execution order on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub steps: Vec<Step>,
}

/// A single step of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Run(RunStep),
    Repeat(Repeat),
}

/// A leaf step where the athlete runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStep {
    pub remaining: Remaining,
    pub target: Option<Target>,
}

/// A repeated block of steps. `step_count` caches the number of leaf
/// run-steps in one pass over the children (a nested repeat counts as
/// `count * step_count` leaves).
#[derive(Debug, Clone, PartialEq)]
pub struct Repeat {
    pub count: u32,
    pub steps: Vec<Step>,
    step_count: usize,
}

impl Repeat {
    pub fn new(count: u32, steps: Vec<Step>) -> Self {
        let step_count = steps
            .iter()
            .map(|step| match step {
                Step::Run(_) => 1,
                Step::Repeat(rep) => rep.count as usize * rep.step_count,
            })
            .sum();
        Self {
            count,
            steps,
            step_count,
        }
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }
}

/// The duration clause of a step — exactly one form is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationClause {
    /// Fixed duration in seconds.
    Seconds(u32),
    /// Fixed distance in km.
    Distance(f64),
    /// No fixed end; the step ends on a manual lap press.
    Lap,
}

/// What is left to complete the current step: a duration in seconds, a
/// distance in km, or a manual lap press for lap-terminated steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Remaining {
    pub duration: u32,
    pub distance: f64,
    pub lap_terminated: bool,
    pub prefix: String,
    pub postfix: &'static str,
}

impl Remaining {
    pub fn new(clause: DurationClause, prefix: Option<String>) -> Self {
        let (duration, distance, lap_terminated) = match clause {
            DurationClause::Seconds(secs) => (secs, 0.0, false),
            DurationClause::Distance(km) => (0, km, false),
            DurationClause::Lap => (0, 0.0, true),
        };
        let postfix = if duration != 0 || lap_terminated {
            "s"
        } else {
            "km"
        };
        Self {
            duration,
            distance,
            lap_terminated,
            prefix: prefix.unwrap_or_else(|| "run".to_string()),
            postfix,
        }
    }
}

/// The pace target of a step: either a percentage of the user's maximal
/// heart rate or a speed in km/h, never both. Bounds are the target value
/// plus/minus the margin (default 1.0), zero for the inactive kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub heart_rate: f64,
    pub speed: f64,
    pub margin: f64,
    pub hr_min: f64,
    pub hr_max: f64,
    pub spd_min: f64,
    pub spd_max: f64,
    pub prefix: Option<String>,
}

pub const DEFAULT_MARGIN: f64 = 1.0;

impl Target {
    pub fn heart_rate(value: f64, margin: Option<f64>, prefix: Option<String>) -> Self {
        let margin = margin.unwrap_or(DEFAULT_MARGIN);
        let (hr_min, hr_max) = bounds(value, margin);
        Self {
            heart_rate: value,
            speed: 0.0,
            margin,
            hr_min,
            hr_max,
            spd_min: 0.0,
            spd_max: 0.0,
            prefix,
        }
    }

    pub fn speed(value: f64, margin: Option<f64>, prefix: Option<String>) -> Self {
        let margin = margin.unwrap_or(DEFAULT_MARGIN);
        let (spd_min, spd_max) = bounds(value, margin);
        Self {
            heart_rate: 0.0,
            speed: value,
            margin,
            hr_min: 0.0,
            hr_max: 0.0,
            spd_min,
            spd_max,
            prefix,
        }
    }

    /// The display prefix: the user's explicit prefix, or a kind default.
    pub fn effective_prefix(&self) -> &str {
        match &self.prefix {
            Some(p) => p,
            None if self.heart_rate != 0.0 => "HR",
            None => "spd",
        }
    }
}

/// Margin band around a target value; zero bounds for an unused value.
fn bounds(value: f64, margin: f64) -> (f64, f64) {
    if value != 0.0 {
        (value - margin, value + margin)
    } else {
        (0.0, 0.0)
    }
}
