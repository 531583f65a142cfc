#![no_main]

use std::collections::BinaryHeap;

use arbitrary::{Arbitrary, Unstructured};

use libfuzzer_sys::fuzz_target;
use raysweeper::heap::{Heap, Polarity};

#[derive(Arbitrary, Debug)]
enum Op {
    Push(i32),
    Pop,
}

fn arbitrary_ops(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let polarity = if u.arbitrary()? {
        Polarity::Min
    } else {
        Polarity::Max
    };
    // BinaryHeap is always a max-heap, so flip the values for a min-heap.
    let flip = |x: i32| match polarity {
        Polarity::Min => -(x as i64),
        Polarity::Max => x as i64,
    };

    let len = u.arbitrary_len::<Op>()?;
    let mut heap = Heap::new(polarity, i32::cmp);
    let mut reference = BinaryHeap::new();
    for _ in 0..len {
        let op: Op = u.arbitrary()?;
        match op {
            Op::Push(x) => {
                heap.insert(x);
                reference.push(flip(x));
            }
            Op::Pop => {
                assert_eq!(heap.try_pop().map(flip), reference.pop());
            }
        }
        assert_eq!(heap.len(), reference.len());
        assert_eq!(heap.peek().copied().map(flip), reference.peek().copied());
    }
    assert_eq!(
        heap.into_sorted_vec().into_iter().map(flip).collect::<Vec<_>>(),
        reference.into_sorted_vec().into_iter().rev().collect::<Vec<_>>()
    );
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let u = Unstructured::new(data);
    let _ = arbitrary_ops(u);
});
