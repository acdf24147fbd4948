use glam::Vec3;
use railview::path::{advance, SEGMENTS, START};

#[test]
fn pullout_decrements_z_by_a_tenth() {
    for z in [190.0, 150.0, 114.5] {
        let before = Vec3::new(-265.0, -17.0, z);
        let after = advance(before);
        assert_eq!(after.x, -265.0);
        assert_eq!(after.y, -17.0);
        assert_eq!(after.z, z - 0.1);
    }
}

#[test]
fn advance_is_identity_past_the_route() {
    let cases = [
        Vec3::new(303.0, 0.0, 0.0),
        Vec3::new(400.0, 12.0, -500.0),
        Vec3::new(0.0, 0.0, -419.0),
        Vec3::new(250.0, 8.0, -430.0),
    ];
    for position in cases {
        assert_eq!(advance(position), position, "at {position:?}");
    }
}

#[test]
fn only_the_first_matching_segment_applies() {
    // Deep inside the route many raw guards hold simultaneously; the
    // result must always equal the first matching segment's step.
    let probes = [
        Vec3::new(-260.0, -16.0, 100.0),
        Vec3::new(-230.0, -15.0, -10.0),
        Vec3::new(-100.0, -12.0, -150.0),
        Vec3::new(0.0, -10.0, -200.0),
        Vec3::new(200.0, -6.0, -300.0),
        Vec3::new(290.0, -3.0, -400.0),
    ];
    for position in probes {
        let expected = SEGMENTS
            .iter()
            .find(|s| s.matches(position))
            .map_or(Vec3::ZERO, |s| s.step);
        assert_eq!(advance(position), position + expected, "at {position:?}");
    }
}

#[test]
fn thousand_frames_make_forward_progress() {
    let mut position = START;
    for _ in 0..1000 {
        position = advance(position);
    }
    assert!(position.x > START.x);
    assert!(position.z < START.z);
}

#[test]
fn full_journey_terminates() {
    // Replaying the whole script must reach a fixed point where the
    // train has stopped at the second station, well within a bounded
    // number of frames.
    let mut position = START;
    for _ in 0..100_000 {
        let next = advance(position);
        if next == position {
            assert!(position.x > 100.0, "stopped too early at {position:?}");
            assert!(position.z < -300.0, "stopped too early at {position:?}");
            return;
        }
        position = next;
    }
    panic!("train never reached the end of the route");
}

#[test]
fn elevation_never_decreases() {
    let mut position = START;
    for _ in 0..20_000 {
        let next = advance(position);
        assert!(next.y >= position.y);
        position = next;
    }
}
