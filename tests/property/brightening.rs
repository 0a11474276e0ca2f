//! Brightening invariants

use glint::gradient::{brighten_color, rgb_to_hls};
use proptest::prelude::*;

/// Brightening never darkens: for any source color, the brightened
/// variant's lightness is at least the source lightness.
#[test]
fn test_brighten_never_darkens_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<u8>(), any::<u8>(), any::<u8>()), |(r, g, b)| {
            let (_, l_before, _) = rgb_to_hls(r, g, b);
            let (br, bg, bb, _) = brighten_color(r, g, b, 255);
            let (_, l_after, _) = rgb_to_hls(br, bg, bb);

            prop_assert!(
                l_after >= l_before,
                "brightened ({},{},{}) -> ({},{},{}) lost lightness: {} -> {}",
                r, g, b, br, bg, bb, l_before, l_after
            );
            Ok(())
        })
        .unwrap();
}

/// A fully transparent source always yields the mid alpha, anything else
/// full opacity.
#[test]
fn test_alpha_handling_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>()),
            |(r, g, b, a)| {
                let (_, _, _, alpha) = brighten_color(r, g, b, a);
                if a == 0 {
                    prop_assert_eq!(alpha, 0.5);
                } else {
                    prop_assert_eq!(alpha, 255.0);
                }
                Ok(())
            },
        )
        .unwrap();
}
