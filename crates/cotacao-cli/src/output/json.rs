use cotacao_core::error::CotacaoError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), CotacaoError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
