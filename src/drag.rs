//! Pointer drags on the covariance chart, mapped back into data space.

use crate::core::{CovarianceModel, DragHandle, MeanVector};
use crate::scale::PlanarScales;
use crate::scene::Scene;
use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragHandle),
}

/// Everything a drag can change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CovarianceState {
    pub model: CovarianceModel,
    pub mean: MeanVector,
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start dragging whatever handle lies under `px`, if any.
    pub fn pointer_down(&mut self, px: DVec2, scene: &Scene) -> Option<DragHandle> {
        let handle = scene.hit_test(px)?;
        tracing::debug!(?handle, x = px.x, y = px.y, "drag started");
        self.state = DragState::Dragging(handle);
        Some(handle)
    }

    /// New state for a pointer at `px`, or `None` while idle.
    ///
    /// `scales` must be the ones the current scene was drawn with.
    pub fn pointer_move(&self, px: DVec2, scales: &PlanarScales, current: &CovarianceState) -> Option<CovarianceState> {
        let DragState::Dragging(handle) = self.state else {
            return None;
        };
        let target = scales.to_domain(px);
        if !target.is_finite() {
            return None;
        }
        Some(apply_drag(handle, target, current))
    }

    pub fn pointer_up(&mut self) -> Option<DragHandle> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(handle) => {
                tracing::debug!(?handle, "drag released");
                Some(handle)
            }
            DragState::Idle => None,
        }
    }
}

/// Move `handle` to the data-space point `target`.
pub fn apply_drag(handle: DragHandle, target: DVec2, current: &CovarianceState) -> CovarianceState {
    match handle {
        DragHandle::Mean => CovarianceState {
            model: current.model,
            mean: MeanVector::from(target),
        },
        DragHandle::Eigen1 | DragHandle::Eigen2 => {
            let axis = if handle == DragHandle::Eigen1 { 0 } else { 1 };
            let offset = target - current.mean.as_dvec2();
            let length = offset.length();
            // Collapsing onto the mean has no direction; keep the old one.
            let direction = if length > 0.0 {
                offset / length
            } else {
                current.model.eigenvector(axis)
            };
            CovarianceState {
                model: CovarianceModel::from_axis(handle, direction, length, &current.model),
                mean: current.mean,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::LinearScale;
    use crate::scene::HitTarget;
    use crate::stats::is_orthonormal;

    fn scales() -> PlanarScales {
        PlanarScales {
            x: LinearScale::new([-5.0, 5.0], [0.0, 500.0]),
            y: LinearScale::new([-5.0, 5.0], [500.0, 0.0]),
        }
    }

    fn scene_with_handles() -> Scene {
        let mut scene = Scene::new(DVec2::splat(500.0));
        scene.hit_targets.push(HitTarget {
            handle: DragHandle::Eigen1,
            center: DVec2::new(320.0, 180.0),
            radius: 20.0,
        });
        scene.hit_targets.push(HitTarget {
            handle: DragHandle::Mean,
            center: DVec2::new(250.0, 250.0),
            radius: 5.0,
        });
        scene
    }

    #[test]
    fn state_machine_transitions() {
        let scene = scene_with_handles();
        let mut drag = DragController::new();
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(drag.pointer_down(DVec2::new(10.0, 10.0), &scene), None);
        assert_eq!(drag.state(), DragState::Idle);

        assert_eq!(drag.pointer_down(DVec2::new(325.0, 185.0), &scene), Some(DragHandle::Eigen1));
        assert_eq!(drag.state(), DragState::Dragging(DragHandle::Eigen1));
        assert_eq!(drag.pointer_up(), Some(DragHandle::Eigen1));
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(drag.pointer_up(), None);
    }

    #[test]
    fn idle_moves_change_nothing() {
        let drag = DragController::new();
        let current = CovarianceState::default();
        assert!(drag.pointer_move(DVec2::new(100.0, 100.0), &scales(), &current).is_none());
    }

    #[test]
    fn mean_follows_pointer() {
        let mut drag = DragController::new();
        drag.pointer_down(DVec2::new(250.0, 250.0), &scene_with_handles());
        let current = CovarianceState::default();
        let next = drag.pointer_move(DVec2::new(300.0, 200.0), &scales(), &current).unwrap();
        assert!((next.mean.x - 1.0).abs() < 1e-12);
        assert!((next.mean.y - 1.0).abs() < 1e-12);
        assert_eq!(next.model, current.model);
    }

    #[test]
    fn eigen1_drag_keeps_lambda2_and_basis() {
        let current = CovarianceState::default();
        let next = apply_drag(DragHandle::Eigen1, DVec2::new(0.0, 3.0), &current);
        assert!((next.model.eigenvalues().x - 3.0).abs() < 1e-12);
        assert_eq!(next.model.eigenvalues().y, 1.0);
        assert!((next.model.eigenvector(0) - DVec2::Y).length() < 1e-12);
        // clockwise of +y is +x
        assert!((next.model.eigenvector(1) - DVec2::X).length() < 1e-12);
        assert!(is_orthonormal(next.model.eigenvectors(), 1e-9));
    }

    #[test]
    fn eigen2_drag_rotates_counter_clockwise() {
        let current = CovarianceState {
            model: CovarianceModel::default(),
            mean: MeanVector::new(1.0, 1.0),
        };
        let next = apply_drag(DragHandle::Eigen2, DVec2::new(1.0, -1.0), &current);
        assert_eq!(next.model.eigenvalues().x, 2.0);
        assert!((next.model.eigenvalues().y - 2.0).abs() < 1e-12);
        assert!((next.model.eigenvector(1) - DVec2::new(0.0, -1.0)).length() < 1e-12);
        assert!((next.model.eigenvector(0) - DVec2::X).length() < 1e-12);
        assert_eq!(next.mean, current.mean);
    }

    #[test]
    fn drag_onto_mean_keeps_direction() {
        let current = CovarianceState::default();
        let next = apply_drag(DragHandle::Eigen1, DVec2::ZERO, &current);
        assert_eq!(next.model.eigenvalues().x, 0.0);
        assert_eq!(next.model.eigenvector(0), current.model.eigenvector(0));
        assert!(is_orthonormal(next.model.eigenvectors(), 1e-9));
    }
}
