//! LaTeX source for the readouts next to each chart. Typesetting is left to
//! the page.

use glam::{DMat2, DVec2};

pub fn kl_label() -> &'static str {
    "D_{KL}(P||Q)"
}

/// `x` with exactly two decimals, `-0.00` folded to `0.00`.
pub fn fixed2(x: f64) -> String {
    let s = format!("{x:.2}");
    if s == "-0.00" { "0.00".to_string() } else { s }
}

/// Row-major `bmatrix` of a 2x2 matrix.
pub fn matrix_latex(m: DMat2) -> String {
    let rows = m.transpose();
    format!(
        r"\begin{{bmatrix}}{} & {} \\ {} & {}\end{{bmatrix}}",
        fixed2(rows.x_axis.x),
        fixed2(rows.x_axis.y),
        fixed2(rows.y_axis.x),
        fixed2(rows.y_axis.y),
    )
}

/// Column vector as a one-column `bmatrix`.
pub fn vector_latex(v: DVec2) -> String {
    format!(r"\begin{{bmatrix}}{} \\ {}\end{{bmatrix}}", fixed2(v.x), fixed2(v.y))
}
