#![no_main]

use arbitrary::Unstructured;

use libfuzzer_sys::fuzz_target;
use raysweeper::SweepOptions;

fn sweep_a_scene(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let scene = raysweeper::arbitrary::scene(&mut u)?;
    let options = SweepOptions {
        check_invariants: true,
        ..Default::default()
    };
    let visible = scene.visible(&options).unwrap();
    assert!(visible.windows(2).all(|w| w[0] < w[1]));
    if !scene.segments.is_empty() {
        assert!(!visible.is_empty());
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let u = Unstructured::new(data);
    let _ = sweep_a_scene(u);
});
