use cotacao_core::error::CotacaoError;
use std::path::PathBuf;

use crate::commands::{load_optional_payload, load_pages};
use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    payload_file: Option<PathBuf>,
) -> Result<(), CotacaoError> {
    let payload = load_optional_payload(payload_file.as_deref())?;
    let pages = load_pages(&input_file)?;
    let parsed = cotacao_core::parse_pages(&pages, payload.as_ref());

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} quote(s), written to {}",
                parsed.dataset.len(),
                path.display()
            );
            for w in &parsed.warnings {
                eprintln!("  warning: {}", w.message);
            }
        }
        None => match output_format {
            "json" => output::json::print(&parsed)?,
            _ => output::table::print_parsed(&parsed),
        },
    }

    Ok(())
}
