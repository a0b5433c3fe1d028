//! Time-automated parameters, following WebAudio `AudioParam` semantics.
//!
//! Values are a function of absolute context time. A ramp interpolates from
//! the previous event's value and time up to its own target and time; after
//! the last event the final value is held.

#[derive(Debug, Clone, Copy, PartialEq)]
enum Automation {
    SetValue { time: f64, value: f64 },
    LinearRamp { time: f64, value: f64 },
    ExponentialRamp { time: f64, value: f64 },
}

impl Automation {
    fn time(&self) -> f64 {
        match *self {
            Automation::SetValue { time, .. }
            | Automation::LinearRamp { time, .. }
            | Automation::ExponentialRamp { time, .. } => time,
        }
    }

    fn value(&self) -> f64 {
        match *self {
            Automation::SetValue { value, .. }
            | Automation::LinearRamp { value, .. }
            | Automation::ExponentialRamp { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioParam {
    default_value: f64,
    events: Vec<Automation>,
}

impl AudioParam {
    pub fn new(default_value: f64) -> Self {
        AudioParam {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn set_value_at_time(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(Automation::SetValue { time, value })
    }

    pub fn linear_ramp_to(&mut self, value: f64, end_time: f64) -> &mut Self {
        self.insert(Automation::LinearRamp { time: end_time, value })
    }

    /// Exponential ramps need a strictly positive start and target; otherwise
    /// the previous value is held until `end_time`.
    pub fn exponential_ramp_to(&mut self, value: f64, end_time: f64) -> &mut Self {
        self.insert(Automation::ExponentialRamp { time: end_time, value })
    }

    fn insert(&mut self, event: Automation) -> &mut Self {
        // Events with equal times keep insertion order.
        let idx = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(idx, event);
        self
    }

    /// True when no automation is scheduled.
    pub fn is_constant(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last scheduled event, if any.
    pub fn last_event_time(&self) -> Option<f64> {
        self.events.last().map(Automation::time)
    }

    pub fn value_at(&self, t: f64) -> f64 {
        let mut value = self.default_value;
        let mut prev_time = 0.0;

        for event in &self.events {
            if event.time() <= t {
                value = event.value();
                prev_time = event.time();
                continue;
            }

            let span = event.time() - prev_time;
            if span <= 0.0 {
                return value;
            }
            let frac = ((t - prev_time) / span).clamp(0.0, 1.0);
            return match *event {
                Automation::SetValue { .. } => value,
                Automation::LinearRamp { value: target, .. } => value + (target - value) * frac,
                Automation::ExponentialRamp { value: target, .. } => {
                    if value > 0.0 && target > 0.0 {
                        value * (target / value).powf(frac)
                    } else {
                        value
                    }
                }
            };
        }

        value
    }
}

impl From<f64> for AudioParam {
    fn from(value: f64) -> Self {
        AudioParam::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_param() {
        let p = AudioParam::new(0.5);
        assert!(p.is_constant());
        assert_eq!(p.value_at(0.0), 0.5);
        assert_eq!(p.value_at(10.0), 0.5);
    }

    #[test]
    fn set_value_steps() {
        let mut p = AudioParam::new(0.0);
        p.set_value_at_time(1.0, 0.5);
        assert_eq!(p.value_at(0.49), 0.0);
        assert_eq!(p.value_at(0.5), 1.0);
        assert_eq!(p.value_at(3.0), 1.0);
    }

    #[test]
    fn linear_ramp_interpolates() {
        let mut p = AudioParam::new(0.0);
        p.set_value_at_time(0.0, 1.0).linear_ramp_to(1.0, 2.0);
        assert!((p.value_at(1.5) - 0.5).abs() < 1e-12);
        assert!((p.value_at(2.0) - 1.0).abs() < 1e-12);
        assert!((p.value_at(5.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exponential_ramp_halfway_is_geometric_mean() {
        let mut p = AudioParam::new(0.0);
        p.set_value_at_time(400.0, 0.0).exponential_ramp_to(1600.0, 1.0);
        assert!((p.value_at(0.5) - 800.0).abs() < 1e-9);
    }

    #[test]
    fn exponential_ramp_from_zero_holds() {
        let mut p = AudioParam::new(0.0);
        p.exponential_ramp_to(1.0, 1.0);
        assert_eq!(p.value_at(0.5), 0.0);
        assert_eq!(p.value_at(1.0), 1.0);
    }

    #[test]
    fn events_sorted_regardless_of_insert_order() {
        let mut p = AudioParam::new(0.0);
        p.linear_ramp_to(0.0, 2.0);
        p.set_value_at_time(1.0, 1.0);
        assert_eq!(p.last_event_time(), Some(2.0));
        assert!((p.value_at(1.5) - 0.5).abs() < 1e-12);
    }
}
