//! Cross-checks the agent's conclusions against a SAT encoding of the same
//! observations: every cell it proves must be forced in every model.

use itertools::Itertools;
use minesweeper_ai::{Cell, KnowledgeBase, Minesweeper};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// Encodes "exactly k of `lits` are true" with one clause per combination.
/// Neighbourhoods have at most 8 cells, so the naive encoding stays small.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    // At most k: no k+1 of them are all true.
    if k < lits.len() {
        for combo in lits.iter().copied().combinations(k + 1) {
            let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
            formula.add_clause(&clause);
        }
    }
    // At least k: every n-k+1 of them contain a true one.
    if k > 0 {
        for combo in lits.iter().copied().combinations(lits.len() - k + 1) {
            formula.add_clause(&combo);
        }
    }
}

struct Oracle {
    solver: Solver<'static>,
    vars: HashMap<Cell, Var>,
}

impl Oracle {
    fn from_knowledge(kb: &KnowledgeBase) -> Self {
        let bounds = kb.bounds();
        let mut solver = Solver::new();
        let vars: HashMap<Cell, Var> = bounds.cells().map(|c| (c, solver.new_var())).collect();
        let mine = |cell: &Cell| Lit::from_var(vars[cell], true);

        let mut formula = CnfFormula::new();
        for &probed in kb.moves_made() {
            formula.add_clause(&[!mine(&probed)]);

            let count = kb.observation(probed).expect("probed cell has a count");
            let lits: Vec<Lit> = bounds.neighbors(probed).map(|n| mine(&n)).collect();
            encode_exactly_k(&mut formula, &lits, count as usize);
        }
        solver.add_formula(&formula);

        Oracle { solver, vars }
    }

    /// Whether `cell` can take the given value in some model.
    fn possible(&mut self, cell: Cell, is_mine: bool) -> bool {
        self.solver.assume(&[Lit::from_var(self.vars[&cell], is_mine)]);
        let result = self.solver.solve().expect("solver failed");
        self.solver.assume(&[]);
        result
    }
}

fn play(height: usize, width: usize, mines: usize, seed: u64) -> KnowledgeBase {
    let mut rng = StdRng::seed_from_u64(seed);
    let game = Minesweeper::new(height, width, mines, &mut rng).unwrap();
    let mut kb = KnowledgeBase::new(height, width);

    while let Some(cell) = kb.safe_move().or_else(|| kb.random_move(&mut rng)) {
        if game.is_mine(cell) {
            break;
        }
        kb.observe(cell, game.nearby_mines(cell)).unwrap();
    }
    kb
}

#[test]
fn test_conclusions_are_entailed() {
    for (height, width, mines) in [(5, 5, 4), (8, 8, 10), (6, 10, 12)] {
        for seed in 0..8 {
            let kb = play(height, width, mines, seed);
            let mut oracle = Oracle::from_knowledge(&kb);

            for &cell in kb.known_mines() {
                assert!(
                    !oracle.possible(cell, false),
                    "{cell} marked as mine but can be safe (seed {seed})"
                );
            }
            for &cell in kb.known_safes() {
                assert!(
                    !oracle.possible(cell, true),
                    "{cell} marked as safe but can be a mine (seed {seed})"
                );
            }
        }
    }
}

#[test]
fn test_first_move_never_reports_knowledge_it_lacks() {
    // A lone nonzero count on an open board pins nothing down.
    let mut kb = KnowledgeBase::new(5, 5);
    kb.observe(Cell::new(2, 2), 3).unwrap();

    let mut oracle = Oracle::from_knowledge(&kb);
    assert!(kb.known_mines().is_empty());
    for neighbor in kb.bounds().neighbors(Cell::new(2, 2)) {
        assert!(oracle.possible(neighbor, true));
        assert!(oracle.possible(neighbor, false));
    }
}
