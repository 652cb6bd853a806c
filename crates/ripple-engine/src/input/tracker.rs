use crate::engine::PointerUniform;

/// One host pointer event, already reduced to what the simulation consumes.
/// Coordinates are physical pixels relative to the surface origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    Moved { x: f32, y: f32 },
    Pressed,
    Released,
}

/// Folds pointer events into the pointer uniform.
///
/// Move coordinates are divided by the downscale factor so the shaders see
/// cell coordinates. Positions are not clamped: off-grid values pass
/// through, and the artifacts decide what an off-grid pointer means.
#[derive(Debug, Copy, Clone)]
pub struct InputTracker {
    downscale: f32,
}

impl InputTracker {
    pub fn new(downscale: u32) -> Self {
        Self {
            downscale: downscale.max(1) as f32,
        }
    }

    /// Applies one event to `pointer`. Never touches the previous-position
    /// fields; those lag by one rendered frame and only the frame loop
    /// folds them forward.
    pub fn apply(&self, event: PointerEvent, pointer: &mut PointerUniform) {
        match event {
            PointerEvent::Moved { x, y } => {
                pointer.x = x / self.downscale;
                pointer.y = y / self.downscale;
            }
            PointerEvent::Pressed => pointer.down = 1.0,
            PointerEvent::Released => pointer.down = 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_are_scaled_into_cell_coordinates() {
        let tracker = InputTracker::new(8);
        let mut pointer = PointerUniform::default();

        tracker.apply(PointerEvent::Moved { x: 80.0, y: 44.0 }, &mut pointer);
        assert_eq!((pointer.x, pointer.y), (10.0, 5.5));
    }

    #[test]
    fn off_grid_positions_pass_through_unclamped() {
        let tracker = InputTracker::new(8);
        let mut pointer = PointerUniform::default();

        tracker.apply(
            PointerEvent::Moved {
                x: -16.0,
                y: 1_000_000.0,
            },
            &mut pointer,
        );
        assert_eq!((pointer.x, pointer.y), (-2.0, 125_000.0));
    }

    #[test]
    fn button_state_tracks_press_and_release() {
        let tracker = InputTracker::new(8);
        let mut pointer = PointerUniform::default();

        tracker.apply(PointerEvent::Pressed, &mut pointer);
        assert_eq!(pointer.down, 1.0);
        tracker.apply(PointerEvent::Released, &mut pointer);
        assert_eq!(pointer.down, 0.0);
    }

    #[test]
    fn moves_leave_the_previous_position_alone() {
        let tracker = InputTracker::new(8);
        let mut pointer = PointerUniform::default();
        tracker.apply(PointerEvent::Moved { x: 32.0, y: 32.0 }, &mut pointer);
        pointer.carry();

        tracker.apply(PointerEvent::Moved { x: 160.0, y: 80.0 }, &mut pointer);
        assert_eq!((pointer.prev_x, pointer.prev_y), (4.0, 4.0));
    }

    #[test]
    fn zero_downscale_is_treated_as_one() {
        let tracker = InputTracker::new(0);
        let mut pointer = PointerUniform::default();

        tracker.apply(PointerEvent::Moved { x: 7.0, y: 3.0 }, &mut pointer);
        assert_eq!((pointer.x, pointer.y), (7.0, 3.0));
    }
}
