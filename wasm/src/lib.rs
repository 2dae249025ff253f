use minesweeper_ai as ms;
use wasm_bindgen::prelude::*;

fn load(bts: &[u8]) -> Result<ms::KnowledgeBase, String> {
    ms::KnowledgeBase::deserialize(bts).map_err(|e| e.to_string())
}

fn pair(cell: Option<ms::Cell>) -> Vec<u32> {
    cell.map(|c| vec![c.row as u32, c.col as u32])
        .unwrap_or_default()
}

#[wasm_bindgen]
pub fn create_agent(height: u8, width: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let agent = ms::KnowledgeBase::new(height as usize, width as usize);
    agent.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn add_knowledge(bts: Vec<u8>, row: usize, col: usize, count: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut agent = load(&bts)?;
    agent
        .observe(ms::Cell::new(row, col), count)
        .map_err(|e| e.to_string())?;
    agent.serialize().map_err(|e| e.to_string())
}

/// `[row, col]` of a provably safe cell, or an empty array.
#[wasm_bindgen]
pub fn safe_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let agent = load(&bts)?;
    Ok(pair(agent.safe_move()))
}

#[wasm_bindgen]
pub fn random_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let agent = load(&bts)?;
    Ok(pair(agent.random_move(&mut rand::rng())))
}

/// Known mines as flattened `row, col` pairs.
#[wasm_bindgen]
pub fn known_mines(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let agent = load(&bts)?;
    Ok(agent
        .known_mines()
        .iter()
        .flat_map(|c| [c.row as u32, c.col as u32])
        .collect())
}
