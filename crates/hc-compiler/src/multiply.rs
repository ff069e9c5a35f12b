//! Multiplication strategy planner.
//!
//! HRM assembly has no multiply instruction, so `x * n` (post-lowering,
//! `n` always a non-negative constant on the right) is expanded into a
//! tree of additions. A plan for `n` is a list of factors `f_1 .. f_k`
//! plus an additive `offset` such that `n = f_1 * f_2 * ... * f_k + offset`.
//! Each factor `f_i <= 5` expands to `f_i - 1` self-adds of the running
//! product (`f_i` itself is never emitted as a factor stage — see
//! [`crate::lowering`]); a `remainder` offset becomes one final add of
//! the original operand.
//!
//! Grounded in the description of the planner (no equivalent
//! exists in `examples/original_source/hcast.py`, which never got as far
//! as implementing multiplication) and in the teacher's process-wide
//! memoization idiom — `examples/navicore-cem3/crates/compiler/src/lib.rs`'s
//! `static CLANG_VERSION_CHECKED: OnceLock<..>` for a lazily populated,
//! never-evicted global cache.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// A cost-minimizing decomposition of `n` into `n = product(factors) + offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplyPlan {
    pub factors: Vec<u32>,
    pub offset: u32,
}

impl MultiplyPlan {
    fn cost(&self) -> u32 {
        self.factors.iter().sum::<u32>() + self.offset
    }
}

fn memo() -> &'static Mutex<HashMap<u32, MultiplyPlan>> {
    static MEMO: OnceLock<Mutex<HashMap<u32, MultiplyPlan>>> = OnceLock::new();
    MEMO.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Plan the cheapest factorization of `n` (`n >= 2`; `0` and `1` are
/// folded away during lowering before this is ever called). Entries are
/// cached process-wide and never evicted or recomputed once written.
pub fn plan_multiply(n: u32) -> MultiplyPlan {
    if let Some(cached) = memo().lock().unwrap().get(&n) {
        return cached.clone();
    }
    let plan = compute_plan(n);
    memo().lock().unwrap().insert(n, plan.clone());
    plan
}

fn compute_plan(n: u32) -> MultiplyPlan {
    let mut best: Option<MultiplyPlan> = None;
    for f in 2..=5u32.min(n) {
        if n % f != 0 {
            continue;
        }
        let rest = n / f;
        let candidate = if rest <= 1 {
            MultiplyPlan {
                factors: vec![f],
                offset: 0,
            }
        } else {
            let sub = compute_plan(rest);
            let mut factors = sub.factors;
            factors.push(f);
            MultiplyPlan {
                factors,
                offset: sub.offset,
            }
        };
        if best.as_ref().map_or(true, |b| candidate.cost() < b.cost()) {
            best = Some(candidate);
        }
    }

    // Additive remainder: factor out the largest f <= 5 that divides
    // something close to n, then add the leftover directly.
    for f in (2..=5u32).rev() {
        if f > n {
            continue;
        }
        let rest = n / f;
        let offset = n - rest * f;
        if rest == 0 {
            continue;
        }
        let candidate = if rest <= 1 && rest > 0 {
            MultiplyPlan {
                factors: vec![f],
                offset,
            }
        } else {
            let sub = compute_plan(rest);
            let mut factors = sub.factors;
            factors.push(f);
            MultiplyPlan {
                factors,
                offset: sub.offset + offset,
            }
        };
        if best.as_ref().map_or(true, |b| candidate.cost() < b.cost()) {
            best = Some(candidate);
        }
    }

    best.unwrap_or(MultiplyPlan {
        factors: vec![],
        offset: n,
    })
}
