use bevy::math::Vec2;
use confetti::spawn::sample;
use confetti::{ConfigError, EllipseSide, SpawnShape, SpawnShapeValue};
use rand::SeedableRng;
use rand::rngs::SmallRng;

const SAMPLES: usize = 500;

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(11)
}

#[test]
fn point_spawns_at_anchor() {
    let value = SpawnShapeValue::new(SpawnShape::Point);
    let result = sample(&value, 50.0, 50.0, &mut rng());
    assert_eq!(result.offset, Vec2::ZERO);
    assert_eq!(result.edge_angle, None);
}

#[test]
fn rectangle_is_centered() {
    let value = SpawnShapeValue::new(SpawnShape::Rectangle);
    let mut rng = rng();
    let mut saw_negative = false;
    for _ in 0..SAMPLES {
        let offset = sample(&value, 40.0, 10.0, &mut rng).offset;
        assert!((-20.0..=20.0).contains(&offset.x));
        assert!((-5.0..=5.0).contains(&offset.y));
        saw_negative |= offset.x < 0.0;
    }
    assert!(saw_negative);
}

#[test]
fn line_runs_from_anchor_to_extent() {
    let value = SpawnShapeValue::new(SpawnShape::Line);
    let mut rng = rng();
    for _ in 0..SAMPLES {
        let offset = sample(&value, 10.0, 20.0, &mut rng).offset;
        assert!((0.0..=10.0).contains(&offset.x));
        assert!((offset.y - offset.x * 2.0).abs() < 1e-4, "{offset} is off the line");
    }
}

#[test]
fn zero_width_line_is_vertical() {
    let value = SpawnShapeValue::new(SpawnShape::Line);
    let mut rng = rng();
    for _ in 0..SAMPLES {
        let offset = sample(&value, 0.0, 30.0, &mut rng).offset;
        assert_eq!(offset.x, 0.0);
        assert!((0.0..=30.0).contains(&offset.y));
    }
}

#[test]
fn ellipse_interior_stays_inside() {
    let value = SpawnShapeValue::new(SpawnShape::Ellipse);
    let mut rng = rng();
    for _ in 0..SAMPLES {
        let result = sample(&value, 40.0, 20.0, &mut rng);
        let normalized = result.offset / Vec2::new(20.0, 10.0);
        assert!(normalized.length() <= 1.0 + 1e-5);
        assert_eq!(result.edge_angle, None);
    }
}

#[test]
fn ellipse_edges_lie_on_boundary() {
    let value = SpawnShapeValue::ellipse_edges(EllipseSide::Both);
    let mut rng = rng();
    for _ in 0..SAMPLES {
        let result = sample(&value, 2.0, 2.0, &mut rng);
        assert!((result.offset.length() - 1.0).abs() < 1e-4);
        let angle = result.edge_angle.expect("edge samples carry their angle");
        assert!((0.0..=360.0).contains(&angle));
    }
}

#[test]
fn ellipse_top_and_bottom_halves() {
    let mut rng = rng();
    let top = SpawnShapeValue::ellipse_edges(EllipseSide::Top);
    let bottom = SpawnShapeValue::ellipse_edges(EllipseSide::Bottom);
    for _ in 0..SAMPLES {
        assert!(sample(&top, 10.0, 10.0, &mut rng).offset.y <= 1e-4);
        assert!(sample(&bottom, 10.0, 10.0, &mut rng).offset.y >= -1e-4);
    }
}

#[test]
fn degenerate_ellipse_spawns_at_anchor() {
    let mut rng = rng();
    for value in [
        SpawnShapeValue::new(SpawnShape::Ellipse),
        SpawnShapeValue::ellipse_edges(EllipseSide::Both),
    ] {
        assert_eq!(sample(&value, 0.0, 10.0, &mut rng).offset, Vec2::ZERO);
        assert_eq!(sample(&value, 10.0, 0.0, &mut rng).offset, Vec2::ZERO);
    }
}

#[test]
fn sampling_is_deterministic_per_seed() {
    let value = SpawnShapeValue::new(SpawnShape::Ellipse);
    let mut a = rng();
    let mut b = rng();
    for _ in 0..50 {
        assert_eq!(
            sample(&value, 30.0, 30.0, &mut a),
            sample(&value, 30.0, 30.0, &mut b)
        );
    }
}

#[test]
fn shape_names_parse() {
    assert_eq!("point".parse::<SpawnShape>(), Ok(SpawnShape::Point));
    assert_eq!("ellipse".parse::<SpawnShape>(), Ok(SpawnShape::Ellipse));
    assert_eq!("square".parse::<SpawnShape>(), Ok(SpawnShape::Rectangle));
    assert_eq!(SpawnShape::Rectangle.to_string(), "rectangle");
    assert_eq!(
        "hexagon".parse::<SpawnShape>(),
        Err(ConfigError::UnknownSpawnShape("hexagon".to_string()))
    );

    assert_eq!("top".parse::<EllipseSide>(), Ok(EllipseSide::Top));
    assert_eq!(EllipseSide::Bottom.to_string(), "bottom");
    assert!("left".parse::<EllipseSide>().is_err());
}
