use crate::stats;
use crate::{Result, VizError};
use error_stack::Report;
use glam::{DMat2, DVec2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
    pub const fn with_a(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Build from 8-bit channels, e.g. `Color::rgb8(0xf1, 0xc2, 0x32)`.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// `#rrggbb`, alpha is emitted separately as an opacity attribute.
    pub fn to_hex(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    // Blog palette
    pub const AMBER: Self = Self::rgb8(0xea, 0xb3, 0x08);
    pub const GOLD: Self = Self::rgb8(0xf1, 0xc2, 0x32);
    pub const DARK_GOLD: Self = Self::rgb8(0xca, 0x8a, 0x04);
    pub const DARK_GREEN: Self = Self::rgb8(0x00, 0x64, 0x00);
    pub const DARK_RED: Self = Self::rgb8(0x8b, 0x00, 0x00);
}

impl From<Color> for bevy::prelude::Color {
    #[inline]
    fn from(c: Color) -> Self {
        bevy::prelude::Color::srgba(c.r, c.g, c.b, c.a)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    pub size: f32,    // stroke width / point radius
    pub opacity: f32, // multiplied into alpha
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 2.0,
            opacity: 1.0,
        }
    }
}

impl Style {
    #[inline]
    pub const fn color(mut self, c: Color) -> Self {
        self.color = c;
        self
    }

    #[inline]
    pub const fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    #[inline]
    pub const fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Color with opacity folded into alpha.
    pub fn fill(&self) -> Color {
        self.color.with_a(self.color.a * self.opacity)
    }
}

/// Pixel margins around the plot area, in the d3 convention.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(m: f64) -> Self {
        Self::new(m, m, m, m)
    }

    /// Inner plot size for a container of `size`; may be zero or negative.
    pub fn inner(&self, size: DVec2) -> DVec2 {
        DVec2::new(
            size.x - self.left - self.right,
            size.y - self.top - self.bottom,
        )
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(20.0, 20.0, 30.0, 40.0)
    }
}

/// Display-only view of a 1-D Gaussian driven by two sliders.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    pub mean: f64,
    pub std: f64,
}

impl GaussianParams {
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    pub fn pdf(&self, x: f64) -> f64 {
        stats::normal_pdf(x, self.mean, self.std)
    }

    /// KL(self || other).
    pub fn kl_divergence(&self, other: &GaussianParams) -> f64 {
        stats::kl_divergence(self.mean, self.std, other.mean, other.std)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanVector {
    pub x: f64,
    pub y: f64,
}

impl MeanVector {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

impl From<DVec2> for MeanVector {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Which draggable handle of the covariance chart a pointer is holding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragHandle {
    Mean,
    Eigen1,
    Eigen2,
}

/// Eigendecomposition of a 2x2 covariance matrix.
///
/// `eigenvectors` stores the eigenvectors as columns and is kept orthonormal:
/// every update goes through [`CovarianceModel::new`] or rebuilds the second
/// column as a 90° rotation of the first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CovarianceModel {
    eigenvalues: DVec2,
    eigenvectors: DMat2,
}

const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

impl CovarianceModel {
    pub fn new(eigenvalues: DVec2, eigenvectors: DMat2) -> Result<Self> {
        if !(eigenvalues.x >= 0.0 && eigenvalues.y >= 0.0) {
            return Err(Report::new(VizError::InvalidParameter {
                name: "eigenvalues".to_string(),
                reason: format!("must be non-negative, got {eigenvalues}"),
            }));
        }
        if !stats::is_orthonormal(eigenvectors, ORTHONORMAL_TOLERANCE) {
            return Err(Report::new(VizError::InvalidParameter {
                name: "eigenvectors".to_string(),
                reason: "columns must be unit length and perpendicular".to_string(),
            }));
        }
        Ok(Self {
            eigenvalues,
            eigenvectors,
        })
    }

    /// Rebuild from one dragged axis. `direction` must be unit length; the
    /// remaining column is derived by rotation so the basis stays orthonormal.
    pub(crate) fn from_axis(handle: DragHandle, direction: DVec2, length: f64, previous: &Self) -> Self {
        match handle {
            DragHandle::Eigen1 => Self {
                eigenvalues: DVec2::new(length, previous.eigenvalues.y),
                eigenvectors: DMat2::from_cols(direction, stats::rotate_clockwise(direction)),
            },
            DragHandle::Eigen2 => Self {
                eigenvalues: DVec2::new(previous.eigenvalues.x, length),
                eigenvectors: DMat2::from_cols(
                    stats::rotate_counter_clockwise(direction),
                    direction,
                ),
            },
            DragHandle::Mean => *previous,
        }
    }

    pub fn eigenvalues(&self) -> DVec2 {
        self.eigenvalues
    }

    pub fn eigenvectors(&self) -> DMat2 {
        self.eigenvectors
    }

    pub fn eigenvector(&self, axis: usize) -> DVec2 {
        self.eigenvectors.col(axis)
    }

    pub fn covariance(&self) -> DMat2 {
        stats::covariance_from_eigen(self.eigenvalues, self.eigenvectors)
    }

    /// Tip of the arrow drawn for `axis`: mean + λ·v.
    pub fn arrow_tip(&self, axis: usize, mean: MeanVector) -> DVec2 {
        mean.as_dvec2() + self.eigenvector(axis) * self.eigenvalues[axis]
    }
}

impl Default for CovarianceModel {
    fn default() -> Self {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        Self {
            eigenvalues: DVec2::new(2.0, 1.0),
            eigenvectors: DMat2::from_cols(DVec2::new(h, h), DVec2::new(h, -h)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_matches_blog_covariance() {
        let cov = CovarianceModel::default().covariance();
        assert!((cov.x_axis.x - 1.5).abs() < 1e-12);
        assert!((cov.y_axis.x - 0.5).abs() < 1e-12);
        assert!((cov.x_axis.y - 0.5).abs() < 1e-12);
        assert!((cov.y_axis.y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_orthogonal_basis() {
        let skew = DMat2::from_cols(DVec2::X, DVec2::new(1.0, 1.0).normalize());
        let err = CovarianceModel::new(DVec2::ONE, skew).unwrap_err();
        assert!(matches!(
            err.current_context(),
            VizError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn rejects_negative_eigenvalue() {
        assert!(CovarianceModel::new(DVec2::new(-1.0, 1.0), DMat2::IDENTITY).is_err());
    }

    #[test]
    fn arrow_tip_scales_by_eigenvalue() {
        let model = CovarianceModel::new(DVec2::new(3.0, 1.0), DMat2::IDENTITY).unwrap();
        let tip = model.arrow_tip(0, MeanVector::new(1.0, 1.0));
        assert!((tip - DVec2::new(4.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn hex_encoding() {
        assert_eq!(Color::GOLD.to_hex(), "#f1c232");
        assert_eq!(Color::BLACK.to_hex(), "#000000");
    }

    #[test]
    fn kl_of_identical_params_is_zero() {
        let g = GaussianParams::new(0.4, 1.3);
        assert!(g.kl_divergence(&g).abs() < 1e-12);
    }
}
