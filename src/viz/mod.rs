//! Parameters + statistics + renderer, wired so any input redraws the chart.

mod covariance;
mod die;
mod gaussian;
mod kl;
mod stepper;

pub use covariance::CovarianceExplorer;
pub use die::DieDistribution;
pub use gaussian::GaussianExplorer;
pub use kl::KlDivergenceExplorer;
pub use stepper::DiffusionStepper;

use crate::chart::ChartRenderer;
use crate::param::{NumericParameter, SliderView, Subscription};
use crate::scale::PlanarScales;
use crate::scene::{Container, Scene};
use crate::{Result, VizError};
use error_stack::Report;
use glam::DVec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pointer input in container pixels (origin top-left, y down).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(DVec2),
    Move(DVec2),
    Up,
}

/// A labelled value shown beside a chart, as LaTeX source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    pub label: String,
    pub latex: String,
}

pub trait Visualization: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Parameters keyed by a stable ASCII name.
    fn parameters(&self) -> Vec<(&'static str, NumericParameter)>;

    /// Full redraw for a container of `size`.
    fn draw(&self, renderer: &mut ChartRenderer, size: DVec2) -> Scene;

    /// Preferred container height for a given width.
    fn height_for(&self, width: f64) -> f64;

    /// Returns true when the event changed state and the chart must redraw.
    /// `scales` are the ones `scene` was drawn with.
    fn on_pointer(&self, _event: PointerEvent, _scene: &Scene, _scales: Option<&PlanarScales>) -> bool {
        false
    }

    fn readouts(&self) -> Vec<Readout> {
        vec![]
    }
}

struct Surface {
    container: Container,
    renderer: ChartRenderer,
    generation: u64,
}

impl Surface {
    fn redraw<V: Visualization + ?Sized>(&mut self, viz: &V) {
        let scene = viz.draw(&mut self.renderer, self.container.size());
        self.container.replace(scene);
        self.generation += 1;
        tracing::trace!(viz = viz.name(), generation = self.generation, "redraw");
    }
}

/// A mounted visualization: owns its container and scales exclusively.
pub struct Composition<V: Visualization> {
    viz: Arc<V>,
    surface: Arc<Mutex<Surface>>,
    subscriptions: Vec<Subscription>,
}

impl<V: Visualization> Composition<V> {
    /// Subscribe to every parameter and draw once.
    pub fn mount(viz: V, container: Container) -> Self {
        let viz = Arc::new(viz);
        let surface = Arc::new(Mutex::new(Surface {
            container,
            renderer: ChartRenderer::new(),
            generation: 0,
        }));

        let subscriptions = viz
            .parameters()
            .into_iter()
            .map(|(_, param)| {
                let viz = Arc::downgrade(&viz);
                let surface = Arc::downgrade(&surface);
                param.subscribe(move |_| {
                    if let (Some(viz), Some(surface)) = (viz.upgrade(), surface.upgrade()) {
                        surface.lock().redraw(&*viz);
                    }
                })
            })
            .collect();

        surface.lock().redraw(&*viz);
        tracing::debug!(viz = viz.name(), "mounted");
        Self {
            viz,
            surface,
            subscriptions,
        }
    }

    /// Detach every listener and hand back the cleared container.
    pub fn unmount(self) -> Container {
        let Self {
            viz,
            surface,
            subscriptions,
        } = self;
        drop(subscriptions);
        let mut guard = surface.lock();
        guard.container.clear();
        tracing::debug!(viz = viz.name(), "unmounted");
        std::mem::take(&mut guard.container)
    }

    pub fn visualization(&self) -> &V {
        &self.viz
    }

    pub fn redraw(&self) {
        self.surface.lock().redraw(&*self.viz);
    }

    pub fn resize(&self, size: DVec2) {
        let mut surface = self.surface.lock();
        if surface.container.size() == size {
            return;
        }
        surface.container.set_size(size);
        surface.redraw(&*self.viz);
    }

    pub fn pointer(&self, event: PointerEvent) -> bool {
        let mut surface = self.surface.lock();
        let scales = surface.renderer.planar_scales();
        let changed = self
            .viz
            .on_pointer(event, surface.container.scene(), scales.as_ref());
        if changed {
            surface.redraw(&*self.viz);
        }
        changed
    }

    pub fn scene(&self) -> Scene {
        self.surface.lock().container.scene().clone()
    }

    pub fn generation(&self) -> u64 {
        self.surface.lock().generation
    }

    pub fn size(&self) -> DVec2 {
        self.surface.lock().container.size()
    }

    fn find_parameter(&self, name: &str) -> Result<NumericParameter> {
        self.viz
            .parameters()
            .into_iter()
            .find(|(key, p)| *key == name || p.label() == name)
            .map(|(_, p)| p)
            .ok_or_else(|| Report::new(VizError::UnknownParameter(name.to_string())))
    }
}

/// Object-safe view of any [`Composition`], for render backends.
pub trait MountedVisualization: Send + Sync {
    fn name(&self) -> &'static str;
    fn sliders(&self) -> Vec<(&'static str, SliderView)>;
    fn set_parameter(&self, name: &str, value: f64) -> Result<f64>;
    fn set_parameter_input(&self, name: &str, raw: &str) -> Result<f64>;
    fn pointer_down(&self, px: DVec2) -> bool;
    fn pointer_move(&self, px: DVec2) -> bool;
    fn pointer_up(&self) -> bool;
    fn size(&self) -> DVec2;
    fn resize(&self, size: DVec2);
    fn redraw(&self);
    fn scene(&self) -> Scene;
    fn generation(&self) -> u64;
    fn readouts(&self) -> Vec<Readout>;
    fn height_for(&self, width: f64) -> f64;
    fn unmount(self: Box<Self>) -> Container;
}

impl<V: Visualization> MountedVisualization for Composition<V> {
    fn name(&self) -> &'static str {
        self.viz.name()
    }

    fn sliders(&self) -> Vec<(&'static str, SliderView)> {
        self.viz
            .parameters()
            .into_iter()
            .map(|(key, p)| (key, p.view()))
            .collect()
    }

    fn set_parameter(&self, name: &str, value: f64) -> Result<f64> {
        Ok(self.find_parameter(name)?.set_value(value))
    }

    fn set_parameter_input(&self, name: &str, raw: &str) -> Result<f64> {
        self.find_parameter(name)?.set_from_input(raw)
    }

    fn pointer_down(&self, px: DVec2) -> bool {
        self.pointer(PointerEvent::Down(px))
    }

    fn pointer_move(&self, px: DVec2) -> bool {
        self.pointer(PointerEvent::Move(px))
    }

    fn pointer_up(&self) -> bool {
        self.pointer(PointerEvent::Up)
    }

    fn size(&self) -> DVec2 {
        Composition::size(self)
    }

    fn resize(&self, size: DVec2) {
        Composition::resize(self, size);
    }

    fn redraw(&self) {
        Composition::redraw(self);
    }

    fn scene(&self) -> Scene {
        Composition::scene(self)
    }

    fn generation(&self) -> u64 {
        Composition::generation(self)
    }

    fn readouts(&self) -> Vec<Readout> {
        self.viz.readouts()
    }

    fn height_for(&self, width: f64) -> f64 {
        self.viz.height_for(width)
    }

    fn unmount(self: Box<Self>) -> Container {
        Composition::unmount(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GaussianConfig;

    fn mounted() -> Composition<GaussianExplorer> {
        let viz = GaussianExplorer::from_config(&GaussianConfig::default()).unwrap();
        Composition::mount(viz, Container::new(600.0, 450.0))
    }

    #[test]
    fn mount_draws_once() {
        let c = mounted();
        assert_eq!(c.generation(), 1);
        assert!(!c.scene().is_empty());
    }

    #[test]
    fn every_parameter_change_redraws() {
        let c = mounted();
        let mean = c.visualization().mean().clone();
        mean.set_value(1.0);
        mean.set_value(1.0);
        assert_eq!(c.generation(), 3);
    }

    #[test]
    fn set_parameter_by_key_or_label() {
        let c = mounted();
        assert_eq!(MountedVisualization::set_parameter(&c, "std", 2.04).unwrap(), 2.0);
        assert_eq!(MountedVisualization::set_parameter(&c, r"\mu", 7.0).unwrap(), 5.0);
        let err = MountedVisualization::set_parameter(&c, "nope", 1.0).unwrap_err();
        assert!(matches!(err.current_context(), VizError::UnknownParameter(_)));
    }

    #[test]
    fn resize_redraws_only_on_change() {
        let c = mounted();
        c.resize(DVec2::new(600.0, 450.0));
        assert_eq!(c.generation(), 1);
        c.resize(DVec2::new(300.0, 450.0));
        assert_eq!(c.generation(), 2);
        assert_eq!(c.scene().size, DVec2::new(300.0, 450.0));
    }

    #[test]
    fn unmount_releases_listeners() {
        let c = mounted();
        let mean = c.visualization().mean().clone();
        assert_eq!(mean.subscriber_count(), 1);
        let container = c.unmount();
        assert_eq!(mean.subscriber_count(), 0);
        assert!(container.scene().is_empty());
        mean.set_value(2.0);
    }

    #[test]
    fn pointer_is_ignored_by_plain_charts() {
        let c = mounted();
        assert!(!c.pointer(PointerEvent::Down(DVec2::new(300.0, 200.0))));
        assert_eq!(c.generation(), 1);
    }
}
