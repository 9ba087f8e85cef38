use cotacao_core::aggregate::AggregatedItem;
use cotacao_core::parsing::values::format_ptbr;
use cotacao_core::trace::{ItemAudit, TraceWarning};
use cotacao_core::{ParsedDocument, ProcessResult};
use rust_decimal::Decimal;

fn money(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("R$ {}", format_ptbr(v, 2)),
        None => "-".to_string(),
    }
}

pub fn print_parsed(doc: &ParsedDocument) {
    if doc.header.recognized {
        println!("Relatório de Pesquisa de Preço\n");
    }

    if doc.dataset.is_empty() {
        println!("  No quote rows found. Try `cotacao dump` to inspect the text.\n");
    } else {
        let max_vendor = doc
            .dataset
            .rows
            .iter()
            .map(|r| r.vendor.chars().count())
            .max()
            .unwrap_or(10)
            .clamp(10, 48);

        println!(
            "  {:<6} {:<5} {:<4} {:<width$}  {:>14}  {:<10}  Compõe",
            "Item",
            "Nº",
            "Inc.",
            "Fornecedor",
            "Valor",
            "Data",
            width = max_vendor
        );
        println!("  {}", "-".repeat(max_vendor + 54));

        for row in &doc.dataset.rows {
            let vendor: String = row.vendor.chars().take(max_vendor).collect();
            println!(
                "  {:<6} {:<5} {:<4} {:<width$}  {:>14}  {:<10}  {}",
                row.catalog_item_id,
                row.sequence_number,
                row.source.map(|s| s.numeral()).unwrap_or("-"),
                vendor,
                money(row.value),
                row.quote_date.as_deref().unwrap_or("-"),
                if row.compose_flag { "Sim" } else { "Não" },
                width = max_vendor
            );
        }
        println!();
    }

    println!(
        "  {} row(s), {} without name ({}%)",
        doc.stats.total_rows,
        doc.stats.empty_name_rows,
        format_ptbr(doc.stats.empty_name_pct, 2)
    );
    print_warnings(&doc.warnings);
}

pub fn print_result(result: &ProcessResult, audit: bool) {
    if result.items.is_empty() {
        println!("  No items to aggregate.\n");
    }

    for (item, item_audit) in result.items.iter().zip(&result.audit.items) {
        print_item(item);
        if audit {
            print_audit(item_audit);
        }
        println!();
    }

    print_warnings(&result.audit.warnings);
}

fn print_item(item: &AggregatedItem) {
    let code = item
        .catalog_code
        .as_deref()
        .map(|c| format!(" (CATMAT {c})"))
        .unwrap_or_default();
    println!("=== Item {}{} ===\n", item.item_id, code);
    println!("  Reference price: {}", money(item.reference_price()));
    println!(
        "  Quotes: {} collected, {} high, {} low, {} used",
        item.count_raw, item.count_excluded_high, item.count_excluded_low, item.count_final
    );
    if let Some(method) = item.method {
        println!("  Method: {method}");
    }
}

fn print_audit(audit: &ItemAudit) {
    println!("\n  Policy: {}", audit.policy);
    println!("    {}", audit.rule);

    let values = |vs: &[Decimal]| {
        vs.iter()
            .map(|v| format_ptbr(*v, 2))
            .collect::<Vec<_>>()
            .join("; ")
    };
    println!("  Initial values: {}", values(&audit.initial_values));

    for (label, excluded) in [("high", &audit.excluded_high), ("low", &audit.excluded_low)] {
        for e in excluded {
            let detail = match (e.reference, e.ratio) {
                (Some(r), Some(q)) => format!(" (reference {}, ratio {})", format_ptbr(r, 2), format_ptbr(q, 4)),
                (Some(r), None) => format!(" (limit {})", format_ptbr(r, 2)),
                _ => String::new(),
            };
            println!(
                "  Excluded {label}: Nº {} {}{}",
                e.sequence_number,
                format_ptbr(e.value, 2),
                detail
            );
        }
    }

    println!("  Final values: {}", values(&audit.final_values));
    if let Some(cv) = audit.coefficient_of_variation {
        println!("  CV: {}", format_ptbr(cv, 4));
    }
}

fn print_warnings(warnings: &[TraceWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\nWarnings:");
    for w in warnings {
        println!("  [{:?}] {}", w.severity, w.message);
    }
}
