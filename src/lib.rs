pub mod chart;
pub mod config;
pub mod core;
pub mod drag;
pub mod formula;
pub mod param;
pub mod render;
pub mod runtime;
pub mod scale;
pub mod scene;
pub mod stats;
pub mod viz;

#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid input `{0}`")]
    InvalidInput(String),

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("invalid visualization config")]
    Config,

    #[error("container element `{0}` not found")]
    MissingElement(String),
}

pub type Result<T> = std::result::Result<T, error_stack::Report<VizError>>;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

pub mod prelude {
    pub use crate::chart::*;
    pub use crate::config::*;
    pub use crate::core::*;
    pub use crate::drag::*;
    pub use crate::param::*;
    pub use crate::scale::*;
    pub use crate::scene::*;
    pub use crate::stats::*;
    pub use crate::viz::*;
    pub use crate::{Result, VizError};
}
