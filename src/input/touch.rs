use cgmath::Vector2;
use winit::{
    dpi::PhysicalPosition,
    event::{Touch, TouchPhase},
};

use super::gesture::{GestureEvent, GestureRecognizer, TouchPoint};

/// Tracks winit touch events as an ordered contact list and feeds the
/// recognizer.
///
/// winit reports one event per finger; contacts stay in the order they first
/// touched down, so "first contact" is stable for the rotation angle.
#[derive(Debug, Default)]
pub struct TouchTracker {
    contacts: Vec<TouchPoint>,
    recognizer: GestureRecognizer,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contacts(&self) -> &[TouchPoint] {
        &self.contacts
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn handle(&mut self, touch: &Touch) -> Option<GestureEvent> {
        self.handle_raw(touch.id, touch.phase, touch.location)
    }

    pub fn handle_raw(
        &mut self,
        id: u64,
        phase: TouchPhase,
        location: PhysicalPosition<f64>,
    ) -> Option<GestureEvent> {
        let position = Vector2::new(location.x as f32, location.y as f32);
        match phase {
            TouchPhase::Started => {
                self.contacts.retain(|contact| contact.id != id);
                self.contacts.push(TouchPoint { id, position });
                self.recognizer.touch_start(&self.contacts);
                None
            }
            TouchPhase::Moved => {
                let contact = self.contacts.iter_mut().find(|contact| contact.id == id)?;
                contact.position = position;
                self.recognizer.touch_move(&self.contacts)
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.contacts.retain(|contact| contact.id != id);
                self.recognizer.touch_end(&self.contacts);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::gesture::GestureState;

    fn at(x: f64, y: f64) -> PhysicalPosition<f64> {
        PhysicalPosition::new(x, y)
    }

    #[test]
    fn test_drag_produces_translate() {
        let mut tracker = TouchTracker::new();

        assert_eq!(tracker.handle_raw(0, TouchPhase::Started, at(10.0, 10.0)), None);
        let event = tracker.handle_raw(0, TouchPhase::Moved, at(14.0, 7.0));

        assert_eq!(event, Some(GestureEvent::Translate(Vector2::new(4.0, -3.0))));
    }

    #[test]
    fn test_second_finger_starts_pinch() {
        let mut tracker = TouchTracker::new();
        tracker.handle_raw(0, TouchPhase::Started, at(100.0, 100.0));
        tracker.handle_raw(1, TouchPhase::Started, at(200.0, 100.0));

        assert!(matches!(tracker.recognizer().state(), GestureState::Pinch { .. }));

        let event = tracker.handle_raw(1, TouchPhase::Moved, at(250.0, 100.0));
        let Some(GestureEvent::Pinch { scale_delta, .. }) = event else {
            panic!("expected pinch, got {:?}", event);
        };
        assert!((scale_delta - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_lift_clears_gesture_and_contact() {
        let mut tracker = TouchTracker::new();
        tracker.handle_raw(0, TouchPhase::Started, at(100.0, 100.0));
        tracker.handle_raw(1, TouchPhase::Started, at(200.0, 100.0));

        tracker.handle_raw(0, TouchPhase::Cancelled, at(100.0, 100.0));

        assert_eq!(tracker.contacts().len(), 1);
        assert_eq!(*tracker.recognizer().state(), GestureState::None);
        assert_eq!(tracker.handle_raw(1, TouchPhase::Moved, at(220.0, 100.0)), None);
    }

    #[test]
    fn test_move_of_unknown_contact_is_ignored() {
        let mut tracker = TouchTracker::new();

        assert_eq!(tracker.handle_raw(9, TouchPhase::Moved, at(1.0, 1.0)), None);
        assert!(tracker.contacts().is_empty());
    }
}
