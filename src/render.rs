//! Placeholder substitution over layered render data.
//!
//! Templates contain literal `{{key}}` tokens. The data for one render
//! comes in named layers, merged in a fixed order of increasing
//! priority (see [`Layer`]); on a key collision the later layer wins.
//! Scalar values replace every occurrence of their token. A nested map
//! is a sub-render against the in-progress buffer: its leaves (at any
//! depth) are substituted where their tokens occur. Tokens without a
//! value are left verbatim, so a half configured page still renders.

use strum_macros::EnumIter;
use strum::IntoEnumIterator;

use crate::datamap::{DataMap, DataValue};
use crate::dictionary::Dictionary;
use crate::template_store::TemplateStore;

/// Render data layers, lowest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter)]
pub enum Layer {
    /// Request input fields (already HTML-escaped by whoever sets them).
    Inputs,
    /// Status messages collected by the page and its event handler.
    Messages,
    /// Fields set by the event handler.
    EventFields,
    /// Arbitrary data supplied by the page.
    Data,
    /// The dictionary for the active language.
    Dictionary,
    /// Control values and page meta (nonce, language, route, title).
    Control,
}

const LAYER_COUNT: usize = 6;

impl Layer {
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderData {
    layers: [DataMap; LAYER_COUNT],
}

impl RenderData {
    pub fn new() -> Self {
        RenderData::default()
    }

    pub fn layer(&self, layer: Layer) -> &DataMap {
        &self.layers[layer.index()]
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut DataMap {
        &mut self.layers[layer.index()]
    }

    pub fn set(&mut self, layer: Layer, key: &str, value: impl Into<DataValue>) -> &mut Self {
        self.layer_mut(layer).insert(key, value);
        self
    }

    /// Add all entries of `map` to `layer` (the map's values win
    /// within the layer).
    pub fn extend(&mut self, layer: Layer, map: &DataMap) -> &mut Self {
        self.layer_mut(layer).extend_from(map);
        self
    }

    /// Builder variant of `extend`.
    pub fn with(mut self, layer: Layer, map: &DataMap) -> Self {
        self.extend(layer, map);
        self
    }

    pub fn merged(&self) -> DataMap {
        let mut out = DataMap::new();
        for layer in Layer::iter() {
            out.extend_from(self.layer(layer));
        }
        out
    }
}

pub fn token(key: &str) -> String {
    format!("{{{{{key}}}}}")
}

/// Per render state. `recursive` contexts work on a buffer handed down
/// from the parent and never touch the template store.
struct RenderContext<'d> {
    template: Option<&'d str>,
    buffer: String,
    recursive: bool,
}

impl<'d> RenderContext<'d> {
    fn top(template: &'d str, buffer: String) -> Self {
        RenderContext { template: Some(template), buffer, recursive: false }
    }

    fn child(buffer: String) -> Self {
        RenderContext { template: None, buffer, recursive: true }
    }

    fn run(mut self, data: &DataMap) -> String {
        for (key, value) in data.iter() {
            match value {
                DataValue::Text(s) => {
                    let t = token(key);
                    if self.buffer.contains(&t) {
                        self.buffer = self.buffer.replace(&t, s);
                    }
                }
                DataValue::Map(m) => {
                    let buffer = std::mem::take(&mut self.buffer);
                    self.buffer = RenderContext::child(buffer).run(m);
                }
            }
        }
        if !self.recursive {
            tracing::trace!("rendered {:?}", self.template);
        }
        self.buffer
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderEngine<'t> {
    store: &'t TemplateStore,
}

impl<'t> RenderEngine<'t> {
    pub fn new(store: &'t TemplateStore) -> Self {
        RenderEngine { store }
    }

    pub fn store(&self) -> &TemplateStore {
        self.store
    }

    /// Render the template at `template` (or the not-found template if
    /// it does not exist).
    pub fn render(&self, template: &str, data: &RenderData) -> String {
        let source = self.store.get_or_not_found(template);
        RenderContext::top(template, source).run(&data.merged())
    }

    /// Render a template given as text.
    pub fn render_str(&self, source: &str, data: &RenderData) -> String {
        render_source(source, &data.merged())
    }
}

/// Substitute `data` into `source`, without any layering.
pub fn render_source(source: &str, data: &DataMap) -> String {
    RenderContext::child(source.to_string()).run(data)
}

/// `{{token}}` rendered against the dictionary alone; unknown tokens
/// come back verbatim.
pub fn translate_token(dictionary: &Dictionary, key: &str) -> String {
    render_source(&token(key), dictionary.entries())
}
