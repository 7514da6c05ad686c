//! Junctions: points where an agent may leave the main line for a branch.

use tr_core::{JunctionId, SplinePointId, StatusFlags};

/// One way out of a junction's start point other than the main line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JunctionBranch {
    pub end:    SplinePointId,
    /// Relative likelihood of being taken.  Non-positive weights never win.
    pub weight: f32,
}

/// Indicator behaviour around a junction.
///
/// `pre` is the distance before the start point at which an approaching
/// agent switches its indicator on; `post` is how far past the start point
/// it keeps indicating.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JunctionSignals {
    pub indicate_distance_pre:  f32,
    pub indicate_distance_post: f32,
    pub indicate_when_taken:     StatusFlags,
    pub indicate_when_not_taken: StatusFlags,
}

/// Outcome of an agent's draw at a junction.  Fixed until the agent has
/// passed the junction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JunctionChoice {
    /// Continue on the main line.
    Stay,
    /// Take `branches[i]`.
    Take(u16),
}

impl JunctionChoice {
    #[inline]
    pub fn is_taken(self) -> bool {
        matches!(self, JunctionChoice::Take(_))
    }
}

/// A junction as stored in the built graph.
#[derive(Clone, Debug)]
pub struct Junction {
    pub id:         JunctionId,
    pub start:      SplinePointId,
    pub branches:   Vec<JunctionBranch>,
    /// Relative weight of continuing on the main line.
    pub stay_weight: f32,
    pub signals:    JunctionSignals,
}

impl Junction {
    fn total_weight(&self) -> f32 {
        self.stay_weight.max(0.0)
            + self.branches.iter().map(|b| b.weight.max(0.0)).sum::<f32>()
    }

    /// Probability that an agent leaves the main line here.
    pub fn probability_taken(&self) -> f32 {
        let total = self.total_weight();
        if total <= 0.0 {
            return 0.0;
        }
        1.0 - self.stay_weight.max(0.0) / total
    }

    /// Map a uniform roll in `[0, 1)` onto stay-or-branch by weight.
    ///
    /// The main line occupies the first `stay_weight` of the range, then each
    /// branch in declaration order.
    pub fn choose(&self, roll: f32) -> JunctionChoice {
        let total = self.total_weight();
        if total <= 0.0 {
            return JunctionChoice::Stay;
        }
        let mut acc = self.stay_weight.max(0.0);
        let target = roll.clamp(0.0, 1.0) * total;
        if target < acc {
            return JunctionChoice::Stay;
        }
        let mut last_positive = None;
        for (i, branch) in self.branches.iter().enumerate() {
            if branch.weight <= 0.0 {
                continue;
            }
            acc += branch.weight;
            last_positive = Some(i);
            if target < acc {
                return JunctionChoice::Take(i as u16);
            }
        }
        // Float round-off at the top of the range.
        match last_positive {
            Some(i) => JunctionChoice::Take(i as u16),
            None => JunctionChoice::Stay,
        }
    }

    /// Point reached from `start` under `choice`, if the choice is a branch.
    #[inline]
    pub fn branch_end(&self, choice: JunctionChoice) -> Option<SplinePointId> {
        match choice {
            JunctionChoice::Stay => None,
            JunctionChoice::Take(i) => self.branches.get(i as usize).map(|b| b.end),
        }
    }

    /// Indicator flags for an agent that has drawn `choice` here.
    #[inline]
    pub fn indicator_for(&self, choice: JunctionChoice) -> StatusFlags {
        if choice.is_taken() {
            self.signals.indicate_when_taken
        } else {
            self.signals.indicate_when_not_taken
        }
    }
}
