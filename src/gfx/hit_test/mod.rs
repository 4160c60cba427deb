//! # Surface Classification
//!
//! This module turns the platform's per-frame hit test into placeable surface
//! hits. It runs inside the frame callback, so it never blocks and never
//! propagates a failure: a failed hit test just means "no surface this frame".
//!
//! ## How it works
//!
//! 1. **Source**: request a hit-test source bound to a reference space once per session
//! 2. **Query**: hit-test at the center of the viewport every frame
//! 3. **Classify**: rotate the up vector by the first hit's orientation; the hit
//!    is placeable when that normal is close enough to vertical
//!
//! ## Usage
//!
//! ```no_run
//! use furnish::gfx::hit_test::scripted::ScriptedTracker;
//! use furnish::gfx::hit_test::SurfaceClassifier;
//!
//! let mut tracker = ScriptedTracker::presenting();
//! let mut classifier = SurfaceClassifier::new(0.7);
//! if let Some(hit) = classifier.classify(&mut tracker) {
//!     if hit.is_placeable(0.7) {
//!         println!("floor at {:?}", hit.position);
//!     }
//! }
//! ```

use cgmath::{Quaternion, Vector2, Vector3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::HitTestFailure;
use crate::gfx::geometry::surface_normal;

/// Coordinate frame the tracking service resolves poses against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpace {
    /// Tracks the device; hit tests cast from the viewer's position
    Viewer,
    Local,
    LocalFloor,
}

/// Handle to a hit-test source issued by the tracking service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTestSource {
    pub id: u64,
    pub space: ReferenceSpace,
}

/// Position and orientation of a detected surface point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

/// The platform spatial-tracking service.
pub trait SpatialTracker {
    /// Whether an AR session is currently presenting frames
    fn is_presenting(&self) -> bool;

    /// Requests a hit-test source bound to `space`
    fn request_hit_test_source(
        &mut self,
        space: ReferenceSpace,
    ) -> Result<HitTestSource, HitTestFailure>;

    /// Hit-tests at `point` (normalized viewport coordinates, `(0.5, 0.5)` is
    /// the center) and returns the hits nearest first.
    fn hit_test(
        &mut self,
        source: &HitTestSource,
        point: Vector2<f32>,
    ) -> Result<Vec<Pose>, HitTestFailure>;
}

/// Surface hit for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub normal: Vector3<f32>,
}

impl SurfaceHit {
    pub fn from_pose(pose: Pose) -> Self {
        Self {
            position: pose.position,
            orientation: pose.orientation,
            normal: surface_normal(pose.orientation),
        }
    }

    /// True when the surface is near-horizontal: `normal.y > threshold`
    pub fn is_placeable(&self, threshold: f32) -> bool {
        is_placeable_normal(self.normal, threshold)
    }
}

/// Strict comparison: a normal with `y == threshold` is not placeable.
pub fn is_placeable_normal(normal: Vector3<f32>, threshold: f32) -> bool {
    normal.y > threshold
}

/// Viewport center in normalized coordinates
const VIEWPORT_CENTER: Vector2<f32> = Vector2 { x: 0.5, y: 0.5 };

/// Per-session hit-test adapter
pub struct SurfaceClassifier {
    space: ReferenceSpace,
    threshold: f32,
    /// Cached for the session; dropped when presentation stops
    source: Option<HitTestSource>,
}

impl SurfaceClassifier {
    pub fn new(threshold: f32) -> Self {
        Self::with_space(ReferenceSpace::Viewer, threshold)
    }

    pub fn with_space(space: ReferenceSpace, threshold: f32) -> Self {
        Self {
            space,
            threshold,
            source: None,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Runs this frame's hit test.
    ///
    /// Returns the first hit, placeable or not; use
    /// [`SurfaceHit::is_placeable`] or [`Self::classify_placeable`] to filter.
    pub fn classify<T: SpatialTracker + ?Sized>(&mut self, tracker: &mut T) -> Option<SurfaceHit> {
        if !tracker.is_presenting() {
            self.reset();
            return None;
        }

        match self.try_classify(tracker) {
            Ok(hit) => hit,
            Err(e) => {
                warn!("hit test skipped this frame: {}", e);
                None
            }
        }
    }

    /// Like [`Self::classify`], but only returns placeable hits
    pub fn classify_placeable<T: SpatialTracker + ?Sized>(
        &mut self,
        tracker: &mut T,
    ) -> Option<SurfaceHit> {
        let threshold = self.threshold;
        self.classify(tracker)
            .filter(|hit| hit.is_placeable(threshold))
    }

    fn try_classify<T: SpatialTracker + ?Sized>(
        &mut self,
        tracker: &mut T,
    ) -> Result<Option<SurfaceHit>, HitTestFailure> {
        let source = match self.source {
            Some(source) => source,
            None => {
                let source = tracker.request_hit_test_source(self.space)?;
                debug!("hit-test source {} bound to {:?}", source.id, source.space);
                self.source = Some(source);
                source
            }
        };

        let poses = tracker.hit_test(&source, VIEWPORT_CENTER)?;
        Ok(poses.into_iter().next().map(SurfaceHit::from_pose))
    }

    /// Drops the cached hit-test source
    pub fn reset(&mut self) {
        if let Some(source) = self.source.take() {
            debug!("released hit-test source {}", source.id);
        }
    }
}

/// Scripted tracker for tests and demos: replays one result per frame.
pub mod scripted {
    use std::collections::VecDeque;

    use super::*;

    /// One frame of scripted tracker output
    #[derive(Debug, Clone)]
    pub enum ScriptedFrame {
        Hit(Pose),
        Miss,
        Fail(String),
    }

    #[derive(Debug, Default)]
    pub struct ScriptedTracker {
        pub presenting: bool,
        pub frames: VecDeque<ScriptedFrame>,
        pub source_requests: usize,
        pub fail_source_requests: bool,
        next_source: u64,
    }

    impl ScriptedTracker {
        pub fn presenting() -> Self {
            Self {
                presenting: true,
                ..Self::default()
            }
        }

        pub fn push(&mut self, frame: ScriptedFrame) -> &mut Self {
            self.frames.push_back(frame);
            self
        }

        pub fn push_hit(&mut self, position: Vector3<f32>, orientation: Quaternion<f32>) -> &mut Self {
            self.push(ScriptedFrame::Hit(Pose {
                position,
                orientation,
            }))
        }
    }

    impl SpatialTracker for ScriptedTracker {
        fn is_presenting(&self) -> bool {
            self.presenting
        }

        fn request_hit_test_source(
            &mut self,
            space: ReferenceSpace,
        ) -> Result<HitTestSource, HitTestFailure> {
            self.source_requests += 1;
            if self.fail_source_requests {
                return Err(HitTestFailure::SourceUnavailable("scripted".to_string()));
            }
            self.next_source += 1;
            Ok(HitTestSource {
                id: self.next_source,
                space,
            })
        }

        fn hit_test(
            &mut self,
            _source: &HitTestSource,
            _point: Vector2<f32>,
        ) -> Result<Vec<Pose>, HitTestFailure> {
            match self.frames.pop_front() {
                Some(ScriptedFrame::Hit(pose)) => Ok(vec![pose]),
                Some(ScriptedFrame::Miss) | None => Ok(Vec::new()),
                Some(ScriptedFrame::Fail(reason)) => Err(HitTestFailure::Query(reason)),
            }
        }
    }
}
