//! Ranking and merging of candidate package bindings.
//!
//! Candidates are ranked before any merge is attempted:
//!
//! | Rank | Candidate |
//! |------|-----------|
//! | 0 | absent |
//! | 1 | the not-found sentinel |
//! | 2 | a problem binding |
//! | 3 | a valid binding |
//!
//! Only valid candidates are ever merged into a split.

use crate::binding::PackageRef;
use crate::diag::lookup_debug;
use crate::environment::LookupEnvironment;
use crate::ids::ModuleId;

/// Rank of a valid binding, the only rank eligible for merging.
pub const RANK_VALID: usize = 3;

impl LookupEnvironment {
    /// Rank a candidate binding.
    pub fn rank(&self, candidate: Option<PackageRef>) -> usize {
        match candidate {
            None => 0,
            Some(PackageRef::NotFound) => 1,
            Some(PackageRef::Package(id)) if !self.package(id).is_valid() => 2,
            Some(PackageRef::Package(_)) => RANK_VALID,
        }
    }

    /// Combine two candidates for the same package path.
    ///
    /// The better-ranked candidate wins outright. Two valid candidates are
    /// kept as they are when one subsumes the other, and merged into a new
    /// split seeded with `previous` otherwise. `primary` becomes the
    /// enclosing module of that split.
    pub fn combine(
        &mut self,
        candidate: Option<PackageRef>,
        previous: Option<PackageRef>,
        primary: ModuleId,
    ) -> Option<PackageRef> {
        let prev_rank = self.rank(previous);
        let cur_rank = self.rank(candidate);
        if prev_rank < cur_rank {
            return candidate;
        }
        if prev_rank > cur_rank {
            return previous;
        }
        let (Some(PackageRef::Package(prev)), Some(PackageRef::Package(cur))) = (previous, candidate) else {
            return previous;
        };
        if cur_rank < RANK_VALID {
            return previous;
        }

        if self.subsumes(prev, cur) {
            return previous;
        }
        if self.subsumes(cur, prev) {
            return candidate;
        }

        let span = self.diag.span("combine");
        let _enter = span.enter();
        lookup_debug!(
            self,
            previous = %self.describe(previous),
            candidate = %self.describe(candidate),
            primary = %self.module_name(primary),
            "combine bindings"
        );
        let split = self.new_split(prev, primary);
        self.add_to_split(split, cur);
        lookup_debug!(self, split = %self.describe(Some(PackageRef::Package(split))), "new split binding");
        Some(PackageRef::Package(split))
    }

    /// Combine any number of candidates for the same package path.
    ///
    /// Only the best-ranked candidates are considered. A single best
    /// candidate, or several of a rank below valid, yields the first of
    /// them. Several valid candidates are folded into one split, which is
    /// collapsed again if deduplication left a single incarnation.
    pub fn combine_all(&mut self, candidates: &[Option<PackageRef>], primary: ModuleId) -> Option<PackageRef> {
        let span = self.diag.span("combine_all");
        let _enter = span.enter();
        lookup_debug!(
            self,
            count = candidates.len(),
            primary = %self.module_name(primary),
            "combine all bindings"
        );

        let mut ranked = [0usize; RANK_VALID + 1];
        for &candidate in candidates {
            ranked[self.rank(candidate)] += 1;
        }

        for rank in (0..=RANK_VALID).rev() {
            let num = ranked[rank];
            if num == 0 {
                continue;
            }
            if num == 1 || rank != RANK_VALID {
                let first = candidates.iter().copied().find(|&c| self.rank(c) == rank).flatten();
                lookup_debug!(self, rank, result = %self.describe(first), "combined all as early singleton");
                return first;
            }

            let mut split = None;
            for &candidate in candidates {
                if self.rank(candidate) != rank {
                    continue;
                }
                let Some(PackageRef::Package(id)) = candidate else {
                    continue;
                };
                match split {
                    None => split = Some(self.new_split(id, primary)),
                    Some(split) => self.add_to_split(split, id),
                }
            }
            let result = split.map(|split| PackageRef::Package(self.peel_singleton(split)));
            lookup_debug!(self, rank, result = %self.describe(result), "combined all");
            return result;
        }

        None
    }
}
