//! Property-based invariant tests for `Function` lifecycle operations.
//!
//! 1. A clone answers every call exactly like its source.
//! 2. Clones never share by-value captured state.
//! 3. `take` leaves the source empty and the destination unchanged in behavior.
//! 4. `swap` exchanges behavior across any pair of storage modes.
//! 5. Any sequence of clone/take/swap/drop keeps constructions and drops balanced.

use proptest::prelude::*;
use smallfn::Function;
use smallfn::space::S2;
use std::cell::Cell;
use std::rc::Rc;

type F = Function<dyn Fn(i64) -> i64, S2>;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Builds an affine function `x * k + c`, padded onto the heap when `heap` is set.
fn affine(k: i64, c: i64, heap: bool) -> F {
    if heap {
        let padding = [c; 4];
        Function::new(move |x: i64| x.wrapping_mul(k).wrapping_add(padding[0]))
    } else {
        Function::new(move |x: i64| x.wrapping_mul(k).wrapping_add(c))
    }
}

fn affine_strategy() -> impl Strategy<Value = (i64, i64, bool)> {
    (any::<i64>(), any::<i64>(), any::<bool>())
}

#[derive(Debug, Clone)]
enum Op {
    Clone(usize),
    Take(usize, usize),
    Swap(usize, usize),
    Reset(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Clone),
        (0usize..4, 0usize..4).prop_map(|(a, b)| Op::Take(a, b)),
        (0usize..4, 0usize..4).prop_map(|(a, b)| Op::Swap(a, b)),
        (0usize..4).prop_map(Op::Reset),
    ]
}

/// Counts live copies: incremented on construction and clone, decremented on drop.
struct Tracked {
    live: Rc<Cell<isize>>,
    tag: i64,
}

impl Tracked {
    fn new(live: &Rc<Cell<isize>>, tag: i64) -> Self {
        live.set(live.get() + 1);
        Tracked {
            live: live.clone(),
            tag,
        }
    }

    fn tag(&self) -> i64 {
        self.tag
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Tracked::new(&self.live, self.tag)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

fn tracked(live: &Rc<Cell<isize>>, tag: i64, wide: bool) -> F {
    let t = Tracked::new(live, tag);
    if wide {
        let padding = [0i64; 4];
        Function::new(move |_| t.tag() + padding[0])
    } else {
        Function::new(move |_| t.tag())
    }
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn clone_matches_source(
        (k, c, heap) in affine_strategy(),
        xs in prop::collection::vec(any::<i64>(), 1..16),
    ) {
        let f = affine(k, c, heap);
        let g = f.clone();
        prop_assert_eq!(f.is_heap(), g.is_heap());
        for x in xs {
            prop_assert_eq!(f.call(x), g.call(x));
        }
    }

    #[test]
    fn clones_do_not_share_state(calls in 1usize..8) {
        let count = Cell::new(0i64);
        let f: F = Function::new(move |step: i64| {
            count.set(count.get() + step);
            count.get()
        });
        let g = f.clone();
        for _ in 0..calls {
            f.call(1);
        }
        prop_assert_eq!(g.call(0), 0);
        prop_assert_eq!(f.call(0), i64::try_from(calls).unwrap());
    }

    #[test]
    fn take_leaves_source_empty((k, c, heap) in affine_strategy(), x in any::<i64>()) {
        let mut src = affine(k, c, heap);
        let expected = src.call(x);
        let dst = src.take();
        prop_assert!(src.is_empty());
        prop_assert_eq!(dst.is_heap(), heap);
        prop_assert_eq!(dst.call(x), expected);
    }

    #[test]
    fn swap_exchanges_behavior(
        (k1, c1, heap1) in affine_strategy(),
        (k2, c2, heap2) in affine_strategy(),
        x in any::<i64>(),
    ) {
        let mut a = affine(k1, c1, heap1);
        let mut b = affine(k2, c2, heap2);
        let (before_a, before_b) = (a.call(x), b.call(x));

        smallfn::swap(&mut a, &mut b);
        prop_assert_eq!(a.call(x), before_b);
        prop_assert_eq!(b.call(x), before_a);
        prop_assert_eq!(a.is_heap(), heap2);
        prop_assert_eq!(b.is_heap(), heap1);
    }

    #[test]
    fn operations_keep_lifecycle_balanced(
        wide in prop::collection::vec(any::<bool>(), 4),
        ops in prop::collection::vec(op_strategy(), 0..32),
    ) {
        let live = Rc::new(Cell::new(0));
        {
            let mut slots: Vec<F> = wide
                .iter()
                .enumerate()
                .map(|(i, &wide)| tracked(&live, i64::try_from(i).unwrap(), wide))
                .collect();

            for op in ops {
                match op {
                    Op::Clone(i) => {
                        let copy = slots[i].clone();
                        slots.push(copy);
                    }
                    Op::Take(a, b) => {
                        let moved = slots[b].take();
                        slots[a] = moved;
                    }
                    Op::Swap(a, b) if a != b => {
                        let (lo, hi) = (a.min(b), a.max(b));
                        let (left, right) = slots.split_at_mut(hi);
                        left[lo].swap(&mut right[0]);
                    }
                    Op::Swap(..) => {}
                    Op::Reset(i) => slots[i] = Function::empty(),
                }
            }

            for f in &slots {
                if f.is_some() {
                    let tag = f.call(0);
                    prop_assert!((0..4).contains(&tag));
                }
            }
        }
        prop_assert_eq!(live.get(), 0);
    }
}
