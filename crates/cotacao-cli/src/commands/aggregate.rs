use cotacao_core::error::CotacaoError;
use cotacao_core::policy::builtin;
use cotacao_core::policy::schema::PolicyDef;
use std::path::PathBuf;

use crate::commands::{load_optional_payload, load_pages};
use crate::output;

pub struct AggregateArgs {
    pub input_file: PathBuf,
    pub preset: Option<String>,
    pub policy_file: Option<PathBuf>,
    pub payload: Option<PathBuf>,
    pub output_format: String,
    pub out: Option<PathBuf>,
    pub audit: bool,
}

pub fn run(args: AggregateArgs) -> Result<(), CotacaoError> {
    let policy: PolicyDef = match (&args.policy_file, &args.preset) {
        (Some(path), _) => cotacao_core::policy::load_policy(path)?,
        (None, Some(name)) => builtin::load_preset(name)?,
        (None, None) => builtin::default_policy()?,
    };

    let payload = load_optional_payload(args.payload.as_deref())?;
    let pages = load_pages(&args.input_file)?;
    let result = cotacao_core::process_pages(&pages, payload.as_ref(), &policy);

    if let Some(path) = &args.out {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, json)?;
        eprintln!(
            "Aggregated {} item(s), written to {}",
            result.items.len(),
            path.display()
        );
    }

    match args.output_format.as_str() {
        "json" if args.audit => output::json::print(&result.audit)?,
        "json" => output::json::print(&result)?,
        _ => output::table::print_result(&result, args.audit),
    }

    Ok(())
}
