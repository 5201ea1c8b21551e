//! Runs: domain-coordinate polyline pieces of one isoline.

use crate::grid::DomainPoint;

/// Whether a run is a complete ring or an arc ending on a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// A full ring with no boundary touch; first and last points coincide.
    Closed,
    /// A polyline whose ends terminate on the outer rectangle or a split.
    Open,
}

/// An ordered polyline in year/age coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub kind: RunKind,
    pub points: Vec<DomainPoint>,
}

impl Run {
    pub fn open(points: Vec<DomainPoint>) -> Self {
        Self {
            kind: RunKind::Open,
            points,
        }
    }

    pub fn closed(points: Vec<DomainPoint>) -> Self {
        Self {
            kind: RunKind::Closed,
            points,
        }
    }

    pub fn is_open(&self) -> bool {
        self.kind == RunKind::Open
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounding box as `(min_year, min_age, max_year, max_age)`.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.year, first.age, first.year, first.age),
            |(x0, y0, x1, y1), p| (x0.min(p.year), y0.min(p.age), x1.max(p.year), y1.max(p.age)),
        ))
    }

    /// Area of the bounding box in year × age units.
    pub fn bbox_area(&self) -> f64 {
        self.bbox()
            .map(|(x0, y0, x1, y1)| (x1 - x0) * (y1 - y0))
            .unwrap_or(0.0)
    }
}

/// Which end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Start,
    End,
}

/// Index-addressed storage for one level's runs during stitching.
///
/// Runs are never moved; merging writes the joined run into the first
/// slot and retires the second, so indices held by callers stay valid.
#[derive(Debug, Default)]
pub struct RunArena {
    slots: Vec<Option<Run>>,
}

impl RunArena {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            slots: runs.into_iter().map(Some).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Run> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Indices of live open runs, ascending.
    pub fn open_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(run) if run.is_open() => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Replace run `keep` with `joined` and retire run `retire`.
    ///
    /// Returns the working set with `retire` removed.
    pub fn merge(
        &mut self,
        keep: usize,
        retire: usize,
        joined: Run,
        working: &[usize],
    ) -> Vec<usize> {
        if let Some(slot) = self.slots.get_mut(keep) {
            *slot = Some(joined);
        }
        self.remove(retire, working)
    }

    /// Retire run `index`. Returns the working set without it.
    pub fn remove(&mut self, index: usize, working: &[usize]) -> Vec<usize> {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
        }
        working.iter().copied().filter(|&i| i != index).collect()
    }

    /// Surviving runs in slot order.
    pub fn into_runs(self) -> Vec<Run> {
        self.slots.into_iter().flatten().collect()
    }
}
