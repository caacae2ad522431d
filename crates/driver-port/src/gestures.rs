//! Composed input sequences.
//!
//! Some interactions cannot be expressed as a single element verb: dragging
//! one element onto another, or opening a context menu. Those are built as an
//! ordered gesture list and handed to [`DriverPort::perform`] in one call.
//!
//! [`DriverPort::perform`]: crate::DriverPort::perform

use serde::{Deserialize, Serialize};

use pagewright_core_types::MouseButton;

use crate::port::ElementRef;

/// One step of a composed input sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    /// Move the pointer to the center of an element.
    MoveTo(ElementRef),
    /// Press and hold a mouse button.
    Press(MouseButton),
    /// Release a held mouse button.
    Release(MouseButton),
    /// Press and release in place.
    Click(MouseButton),
}

/// Ordered gesture list with a builder surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gestures {
    steps: Vec<Gesture>,
}

impl Gestures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Gesture] {
        &self.steps
    }

    pub fn move_to(mut self, el: &ElementRef) -> Self {
        self.steps.push(Gesture::MoveTo(el.clone()));
        self
    }

    pub fn press(mut self, button: MouseButton) -> Self {
        self.steps.push(Gesture::Press(button));
        self
    }

    pub fn release(mut self, button: MouseButton) -> Self {
        self.steps.push(Gesture::Release(button));
        self
    }

    pub fn click(mut self, button: MouseButton) -> Self {
        self.steps.push(Gesture::Click(button));
        self
    }

    /// Right-click on an element.
    pub fn context_click(el: &ElementRef) -> Self {
        Self::new().move_to(el).click(MouseButton::Right)
    }

    /// Press on `source`, move to `target`, release.
    pub fn drag_and_drop(source: &ElementRef, target: &ElementRef) -> Self {
        Self::new()
            .move_to(source)
            .press(MouseButton::Left)
            .move_to(target)
            .release(MouseButton::Left)
    }
}
