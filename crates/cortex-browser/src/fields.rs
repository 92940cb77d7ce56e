//! Per-field rendering for snapshot sub-resources.
//!
//! Dispatch is by field name only, never by payload shape. Names without a
//! registered renderer are ignored so the server can introduce new field
//! types without breaking older panels.

use crate::view::{FeelingsSlots, View};
use cortex_core::{Feelings, ImageRef};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

pub const POSE: &str = "pose";
pub const FEELINGS: &str = "feelings";
pub const IMAGE_COLOR: &str = "image_color";
pub const IMAGE_DEPTH: &str = "image_depth";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} payload is malformed: {message}")]
    Payload { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Rendered,
    Ignored,
}

pub trait FieldRenderer: Send {
    fn render(&self, field: &str, payload: &Value, view: &mut View) -> Result<(), FieldError>;
}

impl<F> FieldRenderer for F
where
    F: Fn(&str, &Value, &mut View) -> Result<(), FieldError> + Send,
{
    fn render(&self, field: &str, payload: &Value, view: &mut View) -> Result<(), FieldError> {
        self(field, payload, view)
    }
}

#[derive(Default)]
pub struct FieldRegistry {
    renderers: HashMap<String, Box<dyn FieldRenderer>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pose and depth imagery are registered but inert for now.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(POSE, render_inert);
        registry.register(FEELINGS, render_feelings);
        registry.register(IMAGE_COLOR, render_color_image);
        registry.register(IMAGE_DEPTH, render_inert);
        registry
    }

    /// Adds a renderer, replacing any previous one for the same name.
    pub fn register(&mut self, field: impl Into<String>, renderer: impl FieldRenderer + 'static) {
        self.renderers.insert(field.into(), Box::new(renderer));
    }

    pub fn contains(&self, field: &str) -> bool {
        self.renderers.contains_key(field)
    }

    pub fn dispatch(
        &self,
        field: &str,
        payload: &Value,
        view: &mut View,
    ) -> Result<Dispatch, FieldError> {
        match self.renderers.get(field) {
            Some(renderer) => {
                renderer.render(field, payload, view)?;
                Ok(Dispatch::Rendered)
            }
            None => {
                trace!(field, "no renderer registered");
                Ok(Dispatch::Ignored)
            }
        }
    }
}

fn render_inert(_field: &str, _payload: &Value, _view: &mut View) -> Result<(), FieldError> {
    Ok(())
}

fn render_feelings(field: &str, payload: &Value, view: &mut View) -> Result<(), FieldError> {
    let feelings: Feelings =
        serde_json::from_value(payload.clone()).map_err(|err| FieldError::Payload {
            field: field.to_string(),
            message: err.to_string(),
        })?;
    view.feelings = Some(FeelingsSlots::from(&feelings));
    Ok(())
}

fn render_color_image(field: &str, payload: &Value, view: &mut View) -> Result<(), FieldError> {
    let image = ImageRef::from_field(field, payload).ok_or_else(|| FieldError::Payload {
        field: field.to_string(),
        message: format!("missing `{field}` url"),
    })?;
    view.background = Some(image);
    Ok(())
}
