use cotacao_core::error::CotacaoError;
use cotacao_core::extraction::debug_dump;
use std::path::PathBuf;

use crate::commands::load_pages;

pub fn run(input_file: PathBuf, max_pages: usize, max_lines: usize) -> Result<(), CotacaoError> {
    let pages = load_pages(&input_file)?;
    println!("{}", debug_dump(&pages, max_pages, max_lines));
    Ok(())
}
