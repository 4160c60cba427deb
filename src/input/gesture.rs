//! Multi-touch gesture recognition
//!
//! The recognizer is driven by the live contact list on every touch
//! start/move/end event. The number of contacts at touch-start picks the
//! gesture: one finger translates, two fingers scale and rotate at the same
//! time. There is no pinch-versus-twist disambiguation; every two-finger move
//! reports both deltas.

use cgmath::Vector2;

use crate::gfx::geometry::{angle_about, center, distance};

/// One active contact point in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vector2<f32>,
}

impl TouchPoint {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vector2::new(x, y),
        }
    }
}

/// Baselines carried between events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    None,
    Translate {
        start: Vector2<f32>,
        last: Vector2<f32>,
    },
    /// Two-finger scale and rotate
    Pinch {
        center: Vector2<f32>,
        start_distance: f32,
        start_angle: f32,
    },
}

/// Incremental manipulation produced by a touch-move
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Screen-space movement since the previous move
    Translate(Vector2<f32>),
    /// Both effects of a two-finger move; either delta may be zero
    Pinch { scale_delta: f32, rotate_delta: f32 },
}

/// Receives the individual effects of gesture events.
pub trait GestureHandler {
    fn on_translate(&mut self, delta: Vector2<f32>);
    fn on_rotate(&mut self, delta_angle: f32);
    fn on_scale(&mut self, delta_scale: f32);
}

impl GestureEvent {
    /// Fans the event out to `handler`; a pinch calls scale, then rotate.
    pub fn dispatch<H: GestureHandler + ?Sized>(&self, handler: &mut H) {
        match *self {
            GestureEvent::Translate(delta) => handler.on_translate(delta),
            GestureEvent::Pinch {
                scale_delta,
                rotate_delta,
            } => {
                handler.on_scale(scale_delta);
                handler.on_rotate(rotate_delta);
            }
        }
    }
}

/// Converts contact lists into [`GestureEvent`]s
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    state: GestureState,
    contacts: Vec<TouchPoint>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self {
            state: GestureState::None,
            contacts: Vec::new(),
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Contacts seen by the last event
    pub fn contacts(&self) -> &[TouchPoint] {
        &self.contacts
    }

    /// Starts a new gesture segment from the current contacts
    pub fn touch_start(&mut self, contacts: &[TouchPoint]) {
        self.contacts = contacts.to_vec();
        self.state = match contacts {
            [only] => GestureState::Translate {
                start: only.position,
                last: only.position,
            },
            [first, second] => {
                let pivot = center(first.position, second.position);
                GestureState::Pinch {
                    center: pivot,
                    start_distance: distance(first.position, second.position),
                    start_angle: angle_about(first.position, pivot),
                }
            }
            _ => GestureState::None,
        };
    }

    /// Advances the current gesture, returning the delta since the last move.
    ///
    /// A contact count that does not match the state started at touch-start
    /// produces nothing.
    pub fn touch_move(&mut self, contacts: &[TouchPoint]) -> Option<GestureEvent> {
        self.contacts = contacts.to_vec();
        match (&mut self.state, contacts) {
            (GestureState::Translate { last, .. }, [only]) => {
                let delta = only.position - *last;
                *last = only.position;
                Some(GestureEvent::Translate(delta))
            }
            (
                GestureState::Pinch {
                    center,
                    start_distance,
                    start_angle,
                },
                [first, second],
            ) => {
                let current_distance = distance(first.position, second.position);
                let scale_delta = if *start_distance > 0.0 {
                    current_distance / *start_distance - 1.0
                } else {
                    0.0
                };
                *start_distance = current_distance;

                // Measured around the center captured at touch-start
                let current_angle = angle_about(first.position, *center);
                let rotate_delta = current_angle - *start_angle;
                *start_angle = current_angle;

                Some(GestureEvent::Pinch {
                    scale_delta,
                    rotate_delta,
                })
            }
            _ => None,
        }
    }

    /// Ends the gesture segment.
    ///
    /// Always clears to `None`, even if fingers remain down: lifting one finger
    /// of a pinch does not continue as a drag until a fresh touch-start.
    pub fn touch_end(&mut self, remaining: &[TouchPoint]) {
        self.state = GestureState::None;
        self.contacts.clear();
        if !remaining.is_empty() {
            log::debug!(
                "gesture ended with {} contact(s) still down; waiting for touch-start",
                remaining.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(distance: f32) -> [TouchPoint; 2] {
        [
            TouchPoint::new(1, 200.0 - distance / 2.0, 300.0),
            TouchPoint::new(2, 200.0 + distance / 2.0, 300.0),
        ]
    }

    #[derive(Default)]
    struct Recorded {
        translations: Vec<Vector2<f32>>,
        rotations: Vec<f32>,
        scales: Vec<f32>,
    }

    impl GestureHandler for Recorded {
        fn on_translate(&mut self, delta: Vector2<f32>) {
            self.translations.push(delta);
        }
        fn on_rotate(&mut self, delta_angle: f32) {
            self.rotations.push(delta_angle);
        }
        fn on_scale(&mut self, delta_scale: f32) {
            self.scales.push(delta_scale);
        }
    }

    #[test]
    fn test_single_finger_translate_is_incremental() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.touch_start(&[TouchPoint::new(7, 10.0, 10.0)]);

        let first = recognizer.touch_move(&[TouchPoint::new(7, 15.0, 12.0)]);
        let second = recognizer.touch_move(&[TouchPoint::new(7, 18.0, 12.0)]);

        assert_eq!(first, Some(GestureEvent::Translate(Vector2::new(5.0, 2.0))));
        assert_eq!(second, Some(GestureEvent::Translate(Vector2::new(3.0, 0.0))));
    }

    #[test]
    fn test_scale_deltas_are_relative_to_previous_move() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.touch_start(&pair(100.0));

        let mut recorded = Recorded::default();
        for d in [150.0, 100.0] {
            recognizer.touch_move(&pair(d)).unwrap().dispatch(&mut recorded);
        }

        assert!((recorded.scales[0] - 0.5).abs() < 1e-6);
        assert!((recorded.scales[1] - (-1.0 / 3.0)).abs() < 1e-6);
        // pure pinch: rotation is reported, and is zero
        assert_eq!(recorded.rotations, vec![0.0, 0.0]);
    }

    #[test]
    fn test_twist_reports_both_deltas() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.touch_start(&[TouchPoint::new(1, 100.0, 0.0), TouchPoint::new(2, -100.0, 0.0)]);

        // quarter turn around the origin at constant distance
        let event = recognizer
            .touch_move(&[TouchPoint::new(1, 0.0, 100.0), TouchPoint::new(2, 0.0, -100.0)])
            .unwrap();

        match event {
            GestureEvent::Pinch {
                scale_delta,
                rotate_delta,
            } => {
                assert!(scale_delta.abs() < 1e-6);
                assert!((rotate_delta - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
            }
            other => panic!("expected pinch, got {:?}", other),
        }
    }

    #[test]
    fn test_rotation_uses_original_center() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.touch_start(&[TouchPoint::new(1, 10.0, 0.0), TouchPoint::new(2, -10.0, 0.0)]);

        // both fingers slide up: around their new midpoint nothing turned, but
        // around the touch-start center (0, 0) the first finger moved 45 degrees
        let event = recognizer
            .touch_move(&[TouchPoint::new(1, 10.0, 10.0), TouchPoint::new(2, -10.0, 10.0)])
            .unwrap();

        let GestureEvent::Pinch { rotate_delta, .. } = event else {
            panic!("expected pinch");
        };
        assert!((rotate_delta - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn test_lifting_one_finger_of_pinch_does_not_translate() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.touch_start(&pair(100.0));
        recognizer.touch_move(&pair(120.0));

        let remaining = [TouchPoint::new(2, 260.0, 300.0)];
        recognizer.touch_end(&remaining);
        assert_eq!(*recognizer.state(), GestureState::None);
        assert!(recognizer.contacts().is_empty());

        assert_eq!(recognizer.touch_move(&[TouchPoint::new(2, 280.0, 300.0)]), None);

        // a fresh touch-start begins a new segment
        recognizer.touch_start(&[TouchPoint::new(2, 280.0, 300.0)]);
        assert_eq!(
            recognizer.touch_move(&[TouchPoint::new(2, 290.0, 300.0)]),
            Some(GestureEvent::Translate(Vector2::new(10.0, 0.0)))
        );
    }

    #[test]
    fn test_mismatched_contact_count_is_ignored() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.touch_start(&[TouchPoint::new(1, 0.0, 0.0)]);

        assert_eq!(recognizer.touch_move(&pair(100.0)), None);

        recognizer.touch_start(&[
            TouchPoint::new(1, 0.0, 0.0),
            TouchPoint::new(2, 1.0, 0.0),
            TouchPoint::new(3, 2.0, 0.0),
        ]);
        assert_eq!(*recognizer.state(), GestureState::None);
    }

    #[test]
    fn test_coincident_fingers_do_not_divide_by_zero() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.touch_start(&[TouchPoint::new(1, 5.0, 5.0), TouchPoint::new(2, 5.0, 5.0)]);

        let GestureEvent::Pinch { scale_delta, .. } = recognizer.touch_move(&pair(50.0)).unwrap() else {
            panic!("expected pinch");
        };
        assert_eq!(scale_delta, 0.0);
    }
}
