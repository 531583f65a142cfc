#![no_main]

use arbitrary::{Arbitrary, Unstructured};

use libfuzzer_sys::fuzz_target;
use raysweeper::status::{StatusError, StatusTree};

#[derive(Arbitrary, Debug)]
enum Op {
    Insert { id: u8, val: i16 },
    Remove { id: u8 },
}

impl Op {
    // The reference keeps (id, val) pairs sorted by val, with later
    // insertions going after equal values.
    fn apply_to_vec(&self, vec: &mut Vec<(u8, i16)>) -> Result<(), StatusError<u8>> {
        match *self {
            Op::Insert { id, val } => {
                if vec.iter().any(|&(i, _)| i == id) {
                    return Err(StatusError::DuplicateId(id));
                }
                let pos = vec.partition_point(|&(_, v)| v <= val);
                vec.insert(pos, (id, val));
            }
            Op::Remove { id } => {
                let pos = vec
                    .iter()
                    .position(|&(i, _)| i == id)
                    .ok_or(StatusError::MissingId(id))?;
                vec.remove(pos);
            }
        }
        Ok(())
    }

    fn apply_to_tree(&self, tree: &mut StatusTree<u8, i16>) -> Result<(), StatusError<u8>> {
        match *self {
            Op::Insert { id, val } => tree.insert(id, val).map(|_| ()),
            Op::Remove { id } => tree.remove(id).map(|_| ()),
        }
    }
}

fn arbitrary_ops(mut u: Unstructured) -> Result<(), arbitrary::Error> {
    let len = u.arbitrary_len::<Op>()?;
    let mut vec = Vec::new();
    let mut tree = StatusTree::new();
    for _ in 0..len {
        let op: Op = u.arbitrary()?;
        assert_eq!(op.apply_to_vec(&mut vec), op.apply_to_tree(&mut tree));
        tree.check_invariants();

        assert_eq!(tree.len(), vec.len());
        assert_eq!(
            tree.iter().map(|(id, &val)| (id, val)).collect::<Vec<_>>(),
            vec
        );
        assert_eq!(tree.minimum().map(|n| tree.id(n)), vec.first().map(|p| p.0));
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let u = Unstructured::new(data);
    let _ = arbitrary_ops(u);
});
