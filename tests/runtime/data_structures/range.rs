use confetti::{AnimatedValue, AttributeCurve, Range, RangedValue, ScaledValue};
use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(7)
}

#[test]
fn range_samples_within_bounds() {
    let mut rng = rng();
    let range = Range::new(-2.0, 3.0);
    for _ in 0..1000 {
        let value = range.sample(&mut rng);
        assert!((-2.0..=3.0).contains(&value), "{value} out of range");
    }
}

#[test]
fn range_inverted_bounds_still_sample_between() {
    let mut rng = rng();
    let range = Range::new(10.0, 5.0);
    for _ in 0..100 {
        let value = range.sample(&mut rng);
        assert!((5.0..=10.0).contains(&value));
    }
}

#[test]
fn range_scale_and_negate() {
    let mut range = Range::new(1.0, 2.0);
    range.scale(3.0);
    assert_eq!(range, Range::new(3.0, 6.0));
    assert_eq!(range.negated(), Range::new(-3.0, -6.0));
}

#[test]
fn ranged_value_inactive_samples_zero_without_rng() {
    let value = RangedValue {
        active: false,
        always_active: false,
        low: Range::new(5.0, 10.0),
    };
    let mut a = rng();
    let mut b = rng();
    assert_eq!(value.sample_if_active(&mut a), 0.0);
    assert_eq!(
        a.random::<u32>(),
        b.random::<u32>(),
        "inactive values must not consume randomness"
    );
}

#[test]
fn ranged_value_always_active_overrides_flag() {
    let mut value = RangedValue::inactive().required();
    assert!(value.is_active());
    value.set_low(2.0, 2.0);
    assert_eq!(value.sample_if_active(&mut rng()), 2.0);
}

#[test]
fn scaled_value_absolute_high() {
    let value = ScaledValue::new(
        Range::constant(5.0),
        Range::constant(15.0),
        AttributeCurve::linear(0.0, 1.0),
    );
    let (base, delta) = value.sample_pair(&mut rng());
    assert_eq!((base, delta), (5.0, 10.0));
    assert_eq!(value.at(0.0, base, delta), 5.0);
    assert_eq!(value.at(1.0, base, delta), 15.0);
    assert_eq!(value.at(0.5, base, delta), 10.0);
}

#[test]
fn scaled_value_relative_high() {
    let value = ScaledValue::new(
        Range::constant(5.0),
        Range::constant(15.0),
        AttributeCurve::linear(0.0, 1.0),
    )
    .relative(true);
    let (base, delta) = value.sample_pair(&mut rng());
    assert_eq!((base, delta), (5.0, 15.0));
    assert_eq!(value.at(1.0, base, delta), 20.0);
}

#[test]
fn scaled_value_constant() {
    let value = ScaledValue::constant(3.0);
    let animated = value.animate(&mut rng());
    assert_eq!(animated.current, 3.0);
    assert_eq!(animated.delta, 0.0);
}

#[test]
fn scaled_value_scale_and_match() {
    let mut value = ScaledValue::linear(2.0, 4.0);
    value.scale(0.5);
    assert_eq!(value.low(), Range::constant(1.0));
    assert_eq!(value.high, Range::constant(2.0));

    let mut other = ScaledValue::inactive();
    other.match_ranges(&value);
    assert_eq!(other.low(), value.low());
    assert_eq!(other.high, value.high);
    assert!(!other.is_active(), "matching leaves flags untouched");
}

#[test]
fn animated_value_update() {
    let mut value = AnimatedValue {
        base: 10.0,
        delta: -4.0,
        current: 10.0,
    };
    assert_eq!(value.update(0.5), 8.0);
    assert_eq!(value.current, 8.0);
    assert_eq!(AnimatedValue::fixed(3.0).delta, 0.0);
}
