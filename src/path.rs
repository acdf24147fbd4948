use glam::Vec3;

/// Where the train sits at startup, on the platform of the first station.
pub const START: Vec3 = Vec3::new(-265.0, -17.0, 190.0);

/// One bound of a segment guard.
#[derive(Debug, Clone, Copy)]
pub enum Bound {
    /// Coordinate must equal the threshold exactly.
    Eq(f32),
    /// Coordinate must be strictly below the threshold.
    Below(f32),
    /// Coordinate must be strictly above the threshold.
    Above(f32),
}

impl Bound {
    fn matches(self, value: f32) -> bool {
        match self {
            Bound::Eq(threshold) => value == threshold,
            Bound::Below(threshold) => value < threshold,
            Bound::Above(threshold) => value > threshold,
        }
    }
}

/// One piece of the scripted route: a guard over (x, z) plus the
/// per-frame increment applied while the guard holds.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub x: Bound,
    pub z: Bound,
    pub step: Vec3,
}

impl Segment {
    const fn new(x: Bound, z: Bound, step: Vec3) -> Self {
        Self { x, z, step }
    }

    pub fn matches(&self, position: Vec3) -> bool {
        self.x.matches(position.x) && self.z.matches(position.z)
    }
}

/// The route from the first station to the second, as hand-tuned curve
/// segments. Scanned top to bottom; increments approximate a smooth
/// curve with a gentle climb at the frame rates this runs at.
pub const SEGMENTS: [Segment; 9] = [
    // Straight pull-out along the platform.
    Segment::new(
        Bound::Eq(-265.0),
        Bound::Above(114.0),
        Vec3::new(0.0, 0.0, -0.1),
    ),
    Segment::new(
        Bound::Below(-248.0),
        Bound::Above(-40.0),
        Vec3::new(0.02, 0.004, -0.1),
    ),
    Segment::new(
        Bound::Below(-214.0),
        Bound::Above(-28.0),
        Vec3::new(0.05, 0.002, -0.082),
    ),
    Segment::new(
        Bound::Below(-170.0),
        Bound::Above(-82.0),
        Vec3::new(0.06, 0.002, -0.09),
    ),
    Segment::new(
        Bound::Below(-111.0),
        Bound::Above(-139.0),
        Vec3::new(0.07, 0.002, -0.07),
    ),
    Segment::new(
        Bound::Below(-54.0),
        Bound::Above(-174.0),
        Vec3::new(0.07, 0.002, -0.055),
    ),
    Segment::new(
        Bound::Below(159.0),
        Bound::Above(-248.0),
        Vec3::new(0.09, 0.003, -0.028),
    ),
    Segment::new(
        Bound::Below(270.0),
        Bound::Above(-353.0),
        Vec3::new(0.07, 0.003, -0.07),
    ),
    // Final approach into the second station.
    Segment::new(
        Bound::Below(303.0),
        Bound::Above(-419.0),
        Vec3::new(0.04, 0.004, -0.07),
    ),
];

/// Advances the train by one frame along the scripted route.
///
/// The first segment whose guard holds applies its increment once; past
/// the last segment no guard matches and the position is returned
/// unchanged (the train has arrived).
pub fn advance(position: Vec3) -> Vec3 {
    for segment in &SEGMENTS {
        if segment.matches(position) {
            return position + segment.step;
        }
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_pullout_only_moves_z() {
        let before = Vec3::new(-265.0, -17.0, 150.0);
        let after = advance(before);
        assert_eq!(after.x, before.x);
        assert_eq!(after.y, before.y);
        assert_eq!(after.z, before.z - 0.1);
    }

    #[test]
    fn past_last_segment_is_identity() {
        let arrived = Vec3::new(305.0, 10.0, -425.0);
        assert_eq!(advance(arrived), arrived);

        let past_x = Vec3::new(303.0, 0.0, -400.0);
        assert_eq!(advance(past_x), past_x);
    }

    #[test]
    fn exactly_one_increment_applies_per_call() {
        // Guards overlap when read in isolation; the priority scan makes
        // the first match authoritative. On boundary positions the applied
        // increment must be the first matching segment's step, or zero.
        let boundaries = [
            START,
            Vec3::new(-265.0, -17.0, 114.0),
            Vec3::new(-248.0, -15.0, -40.0),
            Vec3::new(-214.0, -14.0, -28.0),
            Vec3::new(-170.0, -13.0, -82.0),
            Vec3::new(-111.0, -12.0, -139.0),
            Vec3::new(-54.0, -11.0, -174.0),
            Vec3::new(159.0, -9.0, -248.0),
            Vec3::new(270.0, -7.0, -353.0),
            Vec3::new(303.0, -5.0, -419.0),
        ];
        for position in boundaries {
            let expected = SEGMENTS
                .iter()
                .find(|s| s.matches(position))
                .map_or(Vec3::ZERO, |s| s.step);
            assert_eq!(advance(position), position + expected, "at {position:?}");
        }
    }

    #[test]
    fn journey_progresses_monotonically() {
        let mut position = START;
        for _ in 0..1000 {
            let next = advance(position);
            assert!(next.x >= position.x);
            assert!(next.z <= position.z);
            position = next;
        }
        assert!(position.x > START.x);
        assert!(position.z < START.z);
    }

    #[test]
    fn pullout_hands_over_to_first_curve() {
        // Just past the pull-out threshold the first curve segment takes
        // over and starts bending x and y.
        let position = Vec3::new(-265.0, -17.0, 113.9);
        let next = advance(position);
        assert!(next.x > position.x);
        assert!(next.y > position.y);
        assert!(next.z < position.z);
    }
}
