//! Integration tests for two-image morph sessions.

use pixelflock::prelude::*;
use pixelflock::{extract_pixels, start_morph, Pixel};
use std::collections::HashSet;

const WHITE: [u8; 4] = [255, 255, 255, 255];

/// White image with a filled rectangle.
fn rect_image(width: u32, height: u32, rect: (u32, u32, u32, u32), rgba: [u8; 4]) -> SourceImage {
    let mut image = SourceImage::filled(width, height, WHITE);
    let (x0, y0, x1, y1) = rect;
    for y in y0..y1 {
        for x in x0..x1 {
            image.set_pixel(x, y, rgba);
        }
    }
    image
}

fn images() -> (SourceImage, SourceImage) {
    (
        rect_image(30, 20, (5, 5, 15, 15), [200, 20, 20, 255]),
        rect_image(30, 20, (15, 5, 25, 15), [20, 20, 200, 255]),
    )
}

fn session(particles: usize) -> MorphSession {
    let (a, b) = images();
    MorphSession::start(
        SurfaceSize::new(100, 60),
        a,
        b,
        MorphConfig::default().with_particle_count(particles).with_seed(21),
    )
    .unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_both_images_partitioned() {
    let session = session(30);
    let (a, b) = images();
    for (assignment, image) in [
        (session.field().assignment_a(), &a),
        (session.field().assignment_b(), &b),
    ] {
        let expected: HashSet<Pixel> =
            extract_pixels(image, &PixelFilter::morph()).into_iter().collect();
        assert_eq!(assignment.owner_count(), 30);
        assert_eq!(assignment.dropped(), 0);
        let owned: HashSet<Pixel> = assignment.pixels().iter().copied().collect();
        assert_eq!(owned.len(), assignment.assigned());
        assert_eq!(owned, expected);
    }
}

#[test]
fn test_count_capped_by_smaller_image() {
    let a = rect_image(10, 10, (0, 0, 3, 1), [0, 0, 0, 255]);
    let b = rect_image(10, 10, (0, 0, 10, 1), [0, 0, 0, 255]);
    let config = MorphConfig::default().with_seed(1);
    let session = MorphSession::start(SurfaceSize::new(50, 50), a, b, config).unwrap();
    assert_eq!(session.field().len(), 3);
}

#[test]
fn test_transparent_pixels_ignored() {
    let mut a = rect_image(4, 4, (0, 0, 2, 2), [0, 0, 0, 255]);
    a.set_pixel(0, 0, [0, 0, 0, 0]);
    assert_eq!(extract_pixels(&a, &PixelFilter::morph()).len(), 3);
}

#[test]
fn test_empty_image_gives_idle_session() {
    let a = SourceImage::filled(8, 8, WHITE);
    let b = rect_image(8, 8, (0, 0, 4, 4), [0, 0, 0, 255]);
    let config = MorphConfig::default().with_seed(2);
    let mut session = MorphSession::start(SurfaceSize::new(50, 50), a, b, config).unwrap();
    assert!(session.field().is_empty());
    session.request_transition();
    let frame = session.tick(0.0);
    assert!(frame.markers.is_empty());
    assert_eq!(frame.visible_layers().count(), 0);
}

#[test]
fn test_stage_fits_both_images() {
    let a = rect_image(4, 2, (0, 0, 4, 2), [0, 0, 0, 255]);
    let b = rect_image(2, 6, (0, 0, 2, 6), [0, 0, 0, 255]);
    let config = MorphConfig::default().with_seed(3);
    let mut session = MorphSession::start(SurfaceSize::new(20, 20), a, b, config).unwrap();
    assert_eq!(session.stage_size(), Vec2::new(4.0, 6.0));
    assert_eq!(session.offset(), Vec2::new(8.0, 7.0));

    // image A sits in rows 2..4 of the stage, image B in columns 1..3
    for i in 0..session.field().len() {
        let start = session.field().curve(i).start();
        let end = session.field().curve(i).end();
        assert!((2.0..4.0).contains(&start.y));
        assert!((1.0..3.0).contains(&end.x));
    }

    let frame = session.tick(0.0);
    assert_eq!((frame.layers[0].width(), frame.layers[0].height()), (4, 6));
    assert_eq!(frame.layers[0].rgba_at(0, 2), Some([0, 0, 0, 255]));
    assert_eq!(frame.layers[0].rgba_at(0, 0), Some([0, 0, 0, 0]));
}

// ============================================================================
// Phases
// ============================================================================

#[test]
fn test_rest_persists_without_requests() {
    let mut session = session(20);
    for i in 0..600 {
        let frame = session.tick(i as f64 * 100.0);
        assert_eq!(frame.phase, Some(Phase::RestA));
    }
}

#[test]
fn test_transition_completes_after_safety_buffer() {
    let mut session = session(20);
    session.tick(0.0);
    session.request_transition();
    session.tick(16.0);
    assert_eq!(session.phase(), Phase::ToB);

    session.tick(16.0 + 3999.0);
    assert_eq!(session.phase(), Phase::ToB);
    session.tick(16.0 + 4001.0);
    assert_eq!(session.phase(), Phase::RestB);

    session.request_transition();
    session.tick(10_000.0);
    assert_eq!(session.phase(), Phase::ToA);
    session.tick(14_001.0);
    assert_eq!(session.phase(), Phase::RestA);
}

#[test]
fn test_request_during_transition_is_ignored() {
    let mut session = session(20);
    session.tick(0.0);
    session.request_transition();
    session.tick(100.0);
    session.request_transition();
    session.tick(200.0);
    assert_eq!(session.phases().phase_start(), 100.0);
    session.tick(4101.0);
    assert_eq!(session.phase(), Phase::RestB);
}

#[test]
fn test_rest_layers_show_one_image() {
    let mut session = session(40);
    let frame = session.tick(0.0);
    assert!(frame.layers[0].has_content());
    assert!(!frame.layers[1].has_content());
    for marker in frame.markers {
        assert!((marker.radius - 1.0).abs() < 1e-5);
        assert_eq!(marker.color, [200, 20, 20, 255]);
    }

    session.request_transition();
    session.tick(16.0);
    let frame = session.tick(5000.0);
    assert_eq!(frame.phase, Some(Phase::RestB));
    assert!(!frame.layers[0].has_content());
    assert!(frame.layers[1].has_content());
    for marker in frame.markers {
        assert_eq!(marker.color, [20, 20, 200, 255]);
    }
    for i in 0..session.field().len() {
        assert_eq!(session.field().t(i), 1.0);
    }
}

#[test]
fn test_particles_stagger_mid_transition() {
    let mut session = session(40);
    session.tick(0.0);
    session.request_transition();
    session.tick(0.0);
    session.tick(1500.0);

    let ts: Vec<f32> = (0..session.field().len()).map(|i| session.field().t(i)).collect();
    assert!(ts.iter().all(|t| (0.0..=1.0).contains(t)));
    let distinct: HashSet<u32> = ts.iter().map(|t| t.to_bits()).collect();
    assert!(distinct.len() > 1);
}

// ============================================================================
// Loading from disk
// ============================================================================

#[test]
fn test_start_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = images();
    let mut paths = Vec::new();
    for (name, image) in [("a.png", &a), ("b.png", &b)] {
        let path = dir.path().join(name);
        image::RgbaImage::from_raw(image.width(), image.height(), image.data().to_vec())
            .unwrap()
            .save(&path)
            .unwrap();
        paths.push(path);
    }

    let session = start_morph(SurfaceSize::new(100, 100), &paths[0], &paths[1], Some(12)).unwrap();
    assert_eq!(session.field().len(), 12);
    assert_eq!(session.phase(), Phase::RestA);
}
