//! WASM API exports for JavaScript interop
//!
//! A visualization is mounted into a DOM element and rendered as inline SVG.
//! The page forwards slider input and pointer events in element pixels.

#![cfg(target_arch = "wasm32")]

use glam::DVec2;
use wasm_bindgen::prelude::*;

use crate::config::{VisualizationConfig, mount_config};
use crate::scene::Container;
use crate::viz::MountedVisualization;
use crate::{Result, VizError};
use error_stack::Report;

fn to_js(err: Report<VizError>) -> JsValue {
    JsValue::from_str(&format!("{err:?}"))
}

fn find_element(element_id: &str) -> Result<web_sys::Element> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(element_id))
        .ok_or_else(|| Report::new(VizError::MissingElement(element_id.to_string())))
}

/// JavaScript-accessible handle to one mounted visualization
#[wasm_bindgen]
pub struct JsVisualization {
    mounted: Option<Box<dyn MountedVisualization>>,
    element: web_sys::Element,
    /// Generation last written into the element.
    flushed: Option<u64>,
}

#[wasm_bindgen]
impl JsVisualization {
    /// Mount a visualization described by `config_json` into `element_id`.
    ///
    /// The element's current width is measured; the height follows the
    /// visualization's preferred aspect.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, element_id: &str) -> std::result::Result<JsVisualization, JsValue> {
        let config = VisualizationConfig::from_json(config_json).map_err(to_js)?;
        let element = find_element(element_id).map_err(to_js)?;
        let width = element.client_width() as f64;

        let mounted = mount_config(&config, Container::new(width, 0.0)).map_err(to_js)?;
        mounted.resize(DVec2::new(width, mounted.height_for(width)));

        let mut js = JsVisualization {
            mounted: Some(mounted),
            element,
            flushed: None,
        };
        js.flush();
        Ok(js)
    }

    /// Set a slider by key or label; returns the clamped, snapped value.
    #[wasm_bindgen]
    pub fn set_parameter(&mut self, name: &str, value: f64) -> std::result::Result<f64, JsValue> {
        let value = self.mounted()?.set_parameter(name, value).map_err(to_js)?;
        self.flush();
        Ok(value)
    }

    /// Forward a raw range-input value.
    #[wasm_bindgen]
    pub fn set_parameter_input(&mut self, name: &str, raw: &str) -> std::result::Result<f64, JsValue> {
        let value = self.mounted()?.set_parameter_input(name, raw).map_err(to_js)?;
        self.flush();
        Ok(value)
    }

    #[wasm_bindgen]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let changed = self
            .mounted
            .as_ref()
            .is_some_and(|m| m.pointer_down(DVec2::new(x, y)));
        self.flush();
        changed
    }

    #[wasm_bindgen]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let changed = self
            .mounted
            .as_ref()
            .is_some_and(|m| m.pointer_move(DVec2::new(x, y)));
        self.flush();
        changed
    }

    #[wasm_bindgen]
    pub fn pointer_up(&mut self) -> bool {
        let changed = self.mounted.as_ref().is_some_and(|m| m.pointer_up());
        self.flush();
        changed
    }

    /// Re-measure the element and redraw at its new width.
    #[wasm_bindgen]
    pub fn resize(&mut self) {
        let width = self.element.client_width() as f64;
        if let Some(m) = &self.mounted {
            m.resize(DVec2::new(width, m.height_for(width)));
        }
        self.flush();
    }

    /// Slider snapshots as JSON: `[[key, {label, min, max, step, value, fill}], ...]`.
    #[wasm_bindgen]
    pub fn sliders(&self) -> std::result::Result<String, JsValue> {
        let sliders = self.mounted()?.sliders();
        serde_json::to_string(&sliders).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Readouts as JSON: `[{label, latex}, ...]`.
    #[wasm_bindgen]
    pub fn readouts(&self) -> std::result::Result<String, JsValue> {
        let readouts = self.mounted()?.readouts();
        serde_json::to_string(&readouts).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn svg(&self) -> std::result::Result<String, JsValue> {
        Ok(self.mounted()?.scene().to_svg())
    }

    /// Detach all listeners and empty the element. Further calls error.
    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.unmount();
        }
        self.element.set_inner_html("");
        self.flushed = None;
    }
}

impl JsVisualization {
    fn mounted(&self) -> std::result::Result<&dyn MountedVisualization, JsValue> {
        self.mounted
            .as_deref()
            .ok_or_else(|| JsValue::from_str("visualization is unmounted"))
    }

    fn flush(&mut self) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        let generation = mounted.generation();
        if self.flushed == Some(generation) {
            return;
        }
        self.element.set_inner_html(&mounted.scene().to_svg());
        self.flushed = Some(generation);
    }
}

/// Run a visualization in a Bevy canvas instead of inline SVG.
#[wasm_bindgen]
pub fn run_canvas(config_json: &str, canvas_id: &str) -> std::result::Result<(), JsValue> {
    let config = VisualizationConfig::from_json(config_json).map_err(to_js)?;
    crate::runtime::run_visualization(config, canvas_id).map_err(to_js)
}
