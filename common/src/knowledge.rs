use crate::cell::{Bounds, Cell};
use crate::error::{KnowledgeError, Result};
use crate::sentence::Sentence;
use itertools::Itertools;
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Everything one agent has learned about one game.
///
/// The knowledge base owns the canonical sets of probed, safe and mined cells.
/// Sentences only ever see `mark_mine`/`mark_safe` calls for their own cells,
/// so a cell proven here is removed from every sentence in the same step.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    bounds: Bounds,
    /// Cells already probed, with the count the board reported for each.
    observations: HashMap<Cell, u8>,
    moves_made: HashSet<Cell>,
    safes: HashSet<Cell>,
    mines: HashSet<Cell>,
    knowledge: Vec<Sentence>,
    poisoned: bool,
}

impl KnowledgeBase {
    pub fn new(height: usize, width: usize) -> Self {
        Self::with_bounds(Bounds::new(height, width))
    }

    pub fn with_bounds(bounds: Bounds) -> Self {
        KnowledgeBase {
            bounds,
            observations: HashMap::new(),
            moves_made: HashSet::new(),
            safes: HashSet::new(),
            mines: HashSet::new(),
            knowledge: Vec::new(),
            poisoned: false,
        }
    }

    /// Records that `cell` was probed safely and has `count` mines around it.
    ///
    /// Runs the full update before returning:
    /// 1. Marks the cell as a move made and as safe.
    /// 2. Adds a sentence over its unprobed neighbours, reduced by what is already known.
    /// 3. Propagates known mines and safes through every sentence until nothing changes.
    /// 4. Resolves every pair of sentences where one covers a subset of the other.
    /// 5. Propagates again, then drops empty and duplicate sentences.
    ///
    /// Observing a cell twice with the same count is a no-op. Any contradiction
    /// invalidates the knowledge base for the rest of the game.
    pub fn observe(&mut self, cell: Cell, count: u8) -> Result<()> {
        self.ensure_usable(cell)?;

        if let Some(&first) = self.observations.get(&cell) {
            if first == count {
                return Ok(());
            }
            return self.guard(Err(KnowledgeError::InconsistentObservation {
                cell,
                first,
                second: count,
            }));
        }
        if self.mines.contains(&cell) {
            return self.guard(Err(KnowledgeError::ObservedMine { cell }));
        }

        debug!(%cell, count, sentences = self.knowledge.len(), "observing cell");
        self.transact(|kb| kb.absorb(cell, count))
    }

    /// Asserts that `cell` is a mine, as if a flag had been placed on it.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<()> {
        self.ensure_usable(cell)?;
        self.transact(|kb| kb.record_mine(cell).and_then(|_| kb.settle()))
    }

    /// Asserts that `cell` is safe without probing it.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<()> {
        self.ensure_usable(cell)?;
        self.transact(|kb| kb.record_safe(cell).and_then(|_| kb.settle()))
    }

    /// A cell proven safe that has not been probed yet, if any.
    ///
    /// The smallest such cell in (row, col) order is returned, so repeated
    /// runs over the same observations pick the same moves.
    pub fn safe_move(&self) -> Option<Cell> {
        self.safes
            .iter()
            .filter(|cell| !self.moves_made.contains(*cell))
            .min()
            .copied()
    }

    /// A uniformly chosen cell that is neither probed nor a known mine.
    ///
    /// This cell is a guess: nothing certifies it as safe.
    pub fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = self
            .bounds
            .cells()
            .filter(|cell| !self.mines.contains(cell) && !self.moves_made.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn known_mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn known_safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    /// The count reported when `cell` was probed.
    pub fn observation(&self, cell: Cell) -> Option<u8> {
        self.observations.get(&cell).copied()
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.knowledge
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    fn ensure_usable(&self, cell: Cell) -> Result<()> {
        if self.poisoned {
            return Err(KnowledgeError::Poisoned);
        }
        if !self.bounds.contains(cell) {
            return Err(KnowledgeError::OutOfBounds {
                cell,
                height: self.bounds.height,
                width: self.bounds.width,
            });
        }
        Ok(())
    }

    /// Poisons the knowledge base if `result` carries an error.
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!(error = %err, "knowledge base invalidated");
            self.poisoned = true;
        }
        result
    }

    /// Applies `update` to a copy and keeps it only if it succeeds, so a
    /// failed update leaves the last consistent state in place.
    fn transact(&mut self, update: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let mut draft = self.clone();
        let result = update(&mut draft);
        self.guard(result)?;

        let before = (self.mines.len(), self.safes.len());
        *self = draft;
        self.report_progress(before);
        Ok(())
    }

    fn report_progress(&self, (mines, safes): (usize, usize)) {
        let new_mines = self.mines.len() - mines;
        let new_safes = self.safes.len() - safes;
        if new_mines > 0 || new_safes > 0 {
            info!(new_mines, new_safes, "proved new cells");
        }
    }

    fn absorb(&mut self, cell: Cell, count: u8) -> Result<()> {
        self.observations.insert(cell, count);
        self.moves_made.insert(cell);
        self.record_safe(cell)?;

        let neighbors: Vec<Cell> = self
            .bounds
            .neighbors(cell)
            .filter(|n| !self.moves_made.contains(n))
            .collect();
        let sentence = Sentence::new(neighbors, count as usize)?;
        self.integrate(sentence)
    }

    /// Adds a sentence and brings the whole knowledge base back to a fixpoint.
    fn integrate(&mut self, mut sentence: Sentence) -> Result<()> {
        self.reduce(&mut sentence)?;
        self.knowledge.push(sentence);
        self.settle()
    }

    fn settle(&mut self) -> Result<()> {
        self.propagate()?;
        self.resolve_subsets()?;
        self.propagate()?;
        self.cleanup();
        Ok(())
    }

    /// Strips cells that are already known from a sentence not yet in the base.
    fn reduce(&self, sentence: &mut Sentence) -> Result<()> {
        let cells: Vec<Cell> = sentence.cells().iter().copied().collect();
        for cell in cells {
            if self.mines.contains(&cell) {
                sentence.mark_mine(cell)?;
            } else if self.safes.contains(&cell) {
                sentence.mark_safe(cell)?;
            }
        }
        Ok(())
    }

    /// Applies the degenerate sentences until none of them has anything left to say.
    fn propagate(&mut self) -> Result<()> {
        loop {
            let mut mines = BTreeSet::new();
            let mut safes = BTreeSet::new();
            for sentence in &self.knowledge {
                mines.extend(sentence.known_mines());
                safes.extend(sentence.known_safes());
            }
            if mines.is_empty() && safes.is_empty() {
                return Ok(());
            }

            for cell in mines {
                self.record_mine(cell)?;
            }
            for cell in safes {
                self.record_safe(cell)?;
            }
        }
    }

    /// Derives `B - A` with count `B.count - A.count` for every pair where
    /// `A.cells` is a subset of `B.cells`.
    fn resolve_subsets(&mut self) -> Result<()> {
        let snapshot = self.knowledge.clone();
        // Sentences only shrink by losing proven cells, and `inferred` never
        // holds one, so a stale entry here can never match it.
        let mut seen: HashSet<Sentence> = snapshot.iter().cloned().collect();

        for (a, b) in snapshot.iter().tuple_combinations() {
            for (subset, superset) in [(a, b), (b, a)] {
                if subset.is_empty() || !subset.is_subset(superset) {
                    continue;
                }

                // Earlier derivations in this pass may have proven cells that
                // the snapshot still carries.
                let mut inferred = superset.without(subset)?;
                self.reduce(&mut inferred)?;
                if inferred.is_empty() || !seen.insert(inferred.clone()) {
                    continue;
                }

                debug!(%inferred, "derived sentence");
                let mines = inferred.known_mines();
                let safes = inferred.known_safes();
                self.knowledge.push(inferred);

                for cell in mines {
                    self.record_mine(cell)?;
                }
                for cell in safes {
                    self.record_safe(cell)?;
                }
            }
        }
        Ok(())
    }

    /// Drops sentences with no cells and keeps one copy of each duplicate.
    fn cleanup(&mut self) {
        let mut seen = HashSet::new();
        self.knowledge
            .retain(|sentence| !sentence.is_empty() && seen.insert(sentence.clone()));
    }

    fn record_mine(&mut self, cell: Cell) -> Result<bool> {
        if self.safes.contains(&cell) {
            return Err(KnowledgeError::Conflict { cell });
        }
        let fresh = self.mines.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_mine(cell)?;
        }
        Ok(fresh)
    }

    fn record_safe(&mut self, cell: Cell) -> Result<bool> {
        if self.mines.contains(&cell) {
            return Err(KnowledgeError::Conflict { cell });
        }
        let fresh = self.safes.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.mark_safe(cell)?;
        }
        Ok(fresh)
    }
}
