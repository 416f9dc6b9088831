#![no_main]
use charger_core::SocCurve;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Vec<(i32, i32)>, i32)| {
    let (points, mv) = input;
    if let Ok(curve) = SocCurve::new(points) {
        let soc = curve.estimate(mv);
        assert!((0..=100).contains(&soc));
    }
});
