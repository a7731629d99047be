//! Slider-backed numeric parameters with explicit observer registration.

use crate::{Result, VizError};
use error_stack::Report;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

pub type Listener = Arc<dyn Fn(f64) + Send + Sync>;

struct ParamInner {
    label: String,
    min: f64,
    max: f64,
    step: f64,
    value: Mutex<f64>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

/// A labelled scalar bound to `[min, max]` on a `step` grid anchored at `min`.
///
/// Cloning yields another handle to the same parameter.
#[derive(Clone)]
pub struct NumericParameter {
    inner: Arc<ParamInner>,
}

impl std::fmt::Debug for NumericParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumericParameter")
            .field("label", &self.inner.label)
            .field("min", &self.inner.min)
            .field("max", &self.inner.max)
            .field("step", &self.inner.step)
            .field("value", &self.value())
            .finish()
    }
}

/// Snapshot used by slider widgets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliderView {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
    /// Filled share of the slider track, in `[0, 1]`.
    pub fill: f64,
}

impl NumericParameter {
    pub fn new(label: impl Into<String>, min: f64, max: f64, step: f64, initial: f64) -> Result<Self> {
        let label = label.into();
        let invalid = |reason: &str| {
            Report::new(VizError::InvalidParameter {
                name: label.clone(),
                reason: reason.to_string(),
            })
        };
        if !min.is_finite() || !max.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if min > max {
            return Err(invalid("min must not exceed max"));
        }
        if !(step > 0.0) || !step.is_finite() {
            return Err(invalid("step must be positive"));
        }

        let value = snap(initial, min, max, step);
        Ok(Self {
            inner: Arc::new(ParamInner {
                label,
                min,
                max,
                step,
                value: Mutex::new(value),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        })
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn min(&self) -> f64 {
        self.inner.min
    }

    pub fn max(&self) -> f64 {
        self.inner.max
    }

    pub fn step(&self) -> f64 {
        self.inner.step
    }

    pub fn value(&self) -> f64 {
        *self.inner.value.lock()
    }

    /// Clamp, snap to the step grid, store, then notify every subscriber.
    ///
    /// Subscribers run synchronously after the lock is released, so they may
    /// read this or any other parameter.
    pub fn set_value(&self, v: f64) -> f64 {
        let snapped = if v.is_nan() {
            tracing::warn!(label = %self.inner.label, "ignoring NaN slider value");
            self.value()
        } else {
            snap(v, self.inner.min, self.inner.max, self.inner.step)
        };
        *self.inner.value.lock() = snapped;

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(snapped);
        }
        snapped
    }

    /// Apply a raw range-input value as delivered by the DOM.
    pub fn set_from_input(&self, raw: &str) -> Result<f64> {
        let parsed: f64 = raw
            .trim()
            .parse()
            .map_err(|_| Report::new(VizError::InvalidInput(raw.to_string())))?;
        Ok(self.set_value(parsed))
    }

    pub fn fill_fraction(&self) -> f64 {
        let span = self.inner.max - self.inner.min;
        if span <= 0.0 {
            return 0.0;
        }
        (self.value() - self.inner.min) / span
    }

    pub fn view(&self) -> SliderView {
        SliderView {
            label: self.inner.label.clone(),
            min: self.inner.min,
            max: self.inner.max,
            step: self.inner.step,
            value: self.value(),
            fill: self.fill_fraction(),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            param: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

/// Live listener registration. Dropping it detaches the listener.
pub struct Subscription {
    param: Weak<ParamInner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(param) = self.param.upgrade() {
            param.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Clamp into `[min, max]` and round to the nearest grid point `min + k * step`.
fn snap(v: f64, min: f64, max: f64, step: f64) -> f64 {
    let clamped = v.clamp(min, max);
    let mut k = ((clamped - min) / step).round();
    if min + k * step > max + step * 1e-9 {
        k -= 1.0;
    }
    let grid = min + k * step;
    // Prefer the short decimal form only when it still sits on the grid.
    let decimals = decimal_places(step).max(decimal_places(min));
    let scale = 10f64.powi(decimals);
    let pretty = (grid * scale).round() / scale;
    let snapped = if (pretty - grid).abs() <= step * 1e-9 {
        pretty
    } else {
        grid
    };
    snapped.clamp(min, max)
}

/// Decimal places needed to print `x` exactly (capped at 10).
fn decimal_places(x: f64) -> i32 {
    let mut decimals = 0;
    let mut scaled = x;
    while decimals < 10 && (scaled - scaled.round()).abs() > 1e-9 * scaled.abs().max(1.0) {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn clamps_and_snaps() {
        let s = NumericParameter::new("n", 0.0, 10.0, 1.0, 5.0).unwrap();
        assert_eq!(s.value(), 5.0);
        assert_eq!(s.set_value(13.0), 10.0);
        assert_eq!(s.value(), 10.0);
        assert_eq!(s.set_value(5.6), 6.0);
        assert_eq!(s.set_value(-3.0), 0.0);
    }

    #[test]
    fn fractional_steps_land_on_clean_decimals() {
        let s = NumericParameter::new("mu", -5.0, 5.0, 0.1, 0.0).unwrap();
        assert_eq!(s.set_value(0.3), 0.3);
        assert_eq!(s.set_value(-0.34), -0.3);
        assert_eq!(s.set_value(4.96), 5.0);
    }

    #[test]
    fn off_grid_max_rounds_down() {
        let s = NumericParameter::new("x", 0.0, 1.0, 0.3, 0.0).unwrap();
        let v = s.set_value(1.0);
        assert!((v - 0.9).abs() < 1e-12);
    }

    #[test]
    fn long_fractional_min_keeps_grid() {
        let min = -80.56068541279251;
        let s = NumericParameter::new("p", min, min + 64.1025190615322, 0.01, min).unwrap();
        let out = s.set_value(0.0);
        let k = (out - min) / 0.01;
        assert!((k - k.round()).abs() < 1e-6, "{out} off grid (k = {k})");
        assert!((out - (min + 6410.0 * 0.01)).abs() < 1e-9);
    }

    #[test]
    fn initial_value_is_snapped() {
        let s = NumericParameter::new("x", 0.0, 10.0, 2.0, 3.2).unwrap();
        assert_eq!(s.value(), 4.0);
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(NumericParameter::new("x", 1.0, 0.0, 0.1, 0.5).is_err());
        assert!(NumericParameter::new("x", 0.0, 1.0, 0.0, 0.5).is_err());
        assert!(NumericParameter::new("x", 0.0, f64::INFINITY, 0.1, 0.5).is_err());
    }

    #[test]
    fn parses_range_input_strings() {
        let s = NumericParameter::new("sigma", 0.1, 10.0, 0.1, 1.0).unwrap();
        assert_eq!(s.set_from_input("2.5").unwrap(), 2.5);
        let err = s.set_from_input("abc").unwrap_err();
        assert!(matches!(err.current_context(), VizError::InvalidInput(_)));
        assert_eq!(s.value(), 2.5);
    }

    #[test]
    fn fill_fraction_tracks_value() {
        let s = NumericParameter::new("x", 0.0, 10.0, 1.0, 5.0).unwrap();
        assert!((s.fill_fraction() - 0.5).abs() < 1e-12);
        s.set_value(10.0);
        assert!((s.view().fill - 1.0).abs() < 1e-12);

        let fixed = NumericParameter::new("x", 2.0, 2.0, 1.0, 2.0).unwrap();
        assert_eq!(fixed.fill_fraction(), 0.0);
    }

    #[test]
    fn every_set_notifies_synchronously() {
        let s = NumericParameter::new("x", 0.0, 10.0, 1.0, 5.0).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let hits = hits.clone();
            let seen = seen.clone();
            s.subscribe(move |v| {
                hits.fetch_add(1, Ordering::SeqCst);
                seen.lock().push(v);
            })
        };
        s.set_value(7.0);
        s.set_value(7.0);
        s.set_value(42.0);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(*seen.lock(), vec![7.0, 7.0, 10.0]);
    }

    #[test]
    fn listener_may_read_parameter() {
        let s = NumericParameter::new("x", 0.0, 10.0, 1.0, 5.0).unwrap();
        let observed = Arc::new(Mutex::new(0.0));
        let _sub = {
            let handle = s.clone();
            let observed = observed.clone();
            s.subscribe(move |_| *observed.lock() = handle.value())
        };
        s.set_value(3.0);
        assert_eq!(*observed.lock(), 3.0);
    }

    #[test]
    fn dropping_subscription_detaches() {
        let s = NumericParameter::new("x", 0.0, 10.0, 1.0, 5.0).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = {
            let hits = hits.clone();
            s.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert_eq!(s.subscriber_count(), 1);
        s.set_value(1.0);
        sub.unsubscribe();
        assert_eq!(s.subscriber_count(), 0);
        s.set_value(2.0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn set_value_stays_in_range_on_grid(
            min in -100.0_f64..100.0,
            span in 0.0_f64..200.0,
            step_idx in 0_usize..5,
            v in -1e4_f64..1e4,
        ) {
            let step = [0.01, 0.1, 0.25, 1.0, 5.0][step_idx];
            let max = min + span;
            let p = NumericParameter::new("p", min, max, step, min).unwrap();
            let out = p.set_value(v);
            prop_assert!(out >= min && out <= max, "{} not in [{}, {}]", out, min, max);
            let k = (out - min) / step;
            prop_assert!((k - k.round()).abs() < 1e-6, "{} off grid (k = {})", out, k);
        }
    }
}
