use proptest::prelude::*;
use shadowlight_lib::color::MAX_CONTRAST_RATIO;
use shadowlight_lib::{adjust_for_contrast, contrast_ratio, parse_color, Color};

fn any_color() -> impl Strategy<Value = Color> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::new(r, g, b))
}

proptest! {
    #[test]
    fn ratio_is_symmetric(a in any_color(), b in any_color()) {
        prop_assert!((contrast_ratio(a, b) - contrast_ratio(b, a)).abs() < 1e-12);
    }

    #[test]
    fn ratio_stays_in_range(a in any_color(), b in any_color()) {
        let ratio = contrast_ratio(a, b);
        prop_assert!(ratio >= 1.0 - 1e-9);
        prop_assert!(ratio <= MAX_CONTRAST_RATIO + 1e-9);
    }

    #[test]
    fn color_against_itself_is_one(a in any_color()) {
        prop_assert!((contrast_ratio(a, a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn adjustment_meets_achievable_targets(bg in any_color(), target in 1.0f64..=21.0) {
        let picked = adjust_for_contrast(bg, target);
        prop_assert!(picked == Color::NEAR_BLACK || picked == Color::WHITE);

        let best = contrast_ratio(Color::NEAR_BLACK, bg).max(contrast_ratio(Color::WHITE, bg));
        let achieved = contrast_ratio(picked, bg);
        if best >= target {
            prop_assert!(achieved >= target);
        } else {
            prop_assert!((achieved - best).abs() < 1e-12);
        }
    }

    #[test]
    fn near_black_is_preferred_when_it_qualifies(bg in any_color(), target in 1.0f64..=7.0) {
        if contrast_ratio(Color::NEAR_BLACK, bg) >= target {
            prop_assert_eq!(adjust_for_contrast(bg, target), Color::NEAR_BLACK);
        }
    }

    #[test]
    fn hex_parse_recovers_channels(c in any_color()) {
        let upper = format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b);
        let lower = upper.to_lowercase();
        prop_assert_eq!(parse_color(&upper), Some(c));
        prop_assert_eq!(parse_color(&lower), Some(c));
        prop_assert_eq!(parse_color(&c.to_hex()), Some(c));
    }

    #[test]
    fn rgb_function_parse_recovers_channels(c in any_color(), alpha in 0.01f32..=1.0) {
        let rgb = format!("rgb({}, {}, {})", c.r, c.g, c.b);
        let rgba = format!("rgba({},{},{},{alpha})", c.r, c.g, c.b);
        prop_assert_eq!(parse_color(&rgb), Some(c));
        prop_assert_eq!(parse_color(&rgba), Some(c));
    }
}
