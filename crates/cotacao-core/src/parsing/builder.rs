use crate::model::{QuoteRecord, RawLine};
use crate::parsing::classifier::{classify_line, LineClass, LineContext};
use tracing::debug;

/// Result of one full scan over a document's lines.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub records: Vec<QuoteRecord>,
    /// Continuation lines seen while no record was open.
    pub orphan_lines: Vec<RawLine>,
}

/// Explicit state of the record reconstruction scan.
///
/// Lines are fed in document order across all pages; a record stays open
/// across page breaks until the next record start or the end of input.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    current_group: String,
    current_catalog: Option<String>,
    group_has_records: bool,
    current_record: Option<QuoteRecord>,
    output: Vec<QuoteRecord>,
    orphan_lines: Vec<RawLine>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> LineContext {
        LineContext {
            group_has_records: self.group_has_records,
        }
    }

    pub fn has_open_record(&self) -> bool {
        self.current_record.is_some()
    }

    /// Fold step: classify `line` against the current state and apply it.
    pub fn step(mut self, line: &RawLine) -> Self {
        self.push_line(line);
        self
    }

    pub fn push_line(&mut self, line: &RawLine) {
        let class = classify_line(&line.text, self.context());
        self.apply(class, line);
    }

    fn apply(&mut self, class: LineClass, line: &RawLine) {
        match class {
            LineClass::GroupHeader { group_id } => {
                self.current_group = group_id;
                self.current_catalog = None;
                self.group_has_records = false;
            }
            LineClass::CatalogCode { code } => {
                if self.current_catalog.is_none() {
                    self.current_catalog = Some(code);
                } else {
                    debug!(page = line.page_number, line = line.line_index, text = %line.text, "extra catalog line ignored");
                }
            }
            LineClass::RecordStart {
                sequence_number,
                text,
            } => {
                self.close_record();
                self.group_has_records = true;
                self.current_record = Some(QuoteRecord {
                    group_id: self.current_group.clone(),
                    catalog_code: self.current_catalog.clone(),
                    sequence_number,
                    raw_name_text: text,
                    page_number: line.page_number,
                });
            }
            LineClass::Continuation => match self.current_record.as_mut() {
                Some(record) => {
                    record.raw_name_text.push(' ');
                    record.raw_name_text.push_str(&line.text);
                }
                None => {
                    debug!(page = line.page_number, line = line.line_index, text = %line.text, "continuation without open record discarded");
                    self.orphan_lines.push(line.clone());
                }
            },
            LineClass::Noise => {
                debug!(page = line.page_number, line = line.line_index, text = %line.text, "noise line discarded");
            }
        }
    }

    fn close_record(&mut self) {
        if let Some(record) = self.current_record.take() {
            self.output.push(record);
        }
    }

    /// Close the trailing open record and hand back everything collected.
    pub fn finish(mut self) -> BuildOutput {
        self.close_record();
        BuildOutput {
            records: self.output,
            orphan_lines: self.orphan_lines,
        }
    }
}

/// Reconstruct quote records from a document's non-blank lines.
pub fn build_records(lines: &[RawLine]) -> BuildOutput {
    lines
        .iter()
        .fold(RecordBuilder::new(), RecordBuilder::step)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<RawLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| RawLine {
                page_number: 1,
                line_index: i,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_split_vendor_name_scenario() {
        let out = build_records(&lines(&[
            "Item 2",
            "N. 51 - Wel Distrib",
            "uidora Ltda",
            "N. 52 - Acme Co",
        ]));
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].group_id, "2");
        assert_eq!(out.records[0].sequence_number, "51");
        assert_eq!(out.records[0].raw_name_text, "Wel Distrib uidora Ltda");
        assert_eq!(out.records[1].group_id, "2");
        assert_eq!(out.records[1].sequence_number, "52");
        assert_eq!(out.records[1].raw_name_text, "Acme Co");
    }

    #[test]
    fn test_name_reconstruction() {
        let out = build_records(&lines(&["N. 7 - Foo", "Bar", "Baz"]));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].raw_name_text, "Foo Bar Baz");
    }

    #[test]
    fn test_record_count_matches_record_starts() {
        let input = lines(&[
            "Item 1",
            "N. 1 - A",
            "x",
            "N. 1 - B",
            "Página 1 de 2",
            "Item 2",
            "N. 3 - C",
            "y",
            "z",
            "N. 4 - D",
        ]);
        let starts = input
            .iter()
            .filter(|l| l.text.starts_with("N. "))
            .count();
        assert_eq!(build_records(&input).records.len(), starts);
    }

    #[test]
    fn test_last_record_flushed_at_end() {
        let out = build_records(&lines(&["N. 1 - Only", "tail"]));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].raw_name_text, "Only tail");
    }

    #[test]
    fn test_group_carry_over() {
        let out = build_records(&lines(&[
            "N. 1 - Before",
            "Item 3",
            "N. 2 - A",
            "N. 3 - B",
            "Item: 4",
            "N. 4 - C",
        ]));
        let groups: Vec<&str> = out.records.iter().map(|r| r.group_id.as_str()).collect();
        assert_eq!(groups, vec!["", "3", "3", "4"]);
    }

    #[test]
    fn test_noise_discarded_inside_record() {
        let out = build_records(&lines(&["N. 1 - Foo", "Página 1 de 2", "Bar"]));
        assert_eq!(out.records[0].raw_name_text, "Foo Bar");
    }

    #[test]
    fn test_long_line_with_footer_substring_appended() {
        let long = "Distribuidora de Papelaria e Informática Comprasnet Cadastro Nacional Ltda EPP ME";
        let out = build_records(&lines(&["N. 1 - Foo", long]));
        assert_eq!(out.records[0].raw_name_text, format!("Foo {long}"));
    }

    #[test]
    fn test_orphan_continuation_discarded() {
        let out = build_records(&lines(&["Relatório de pesquisa de preço", "Item 1", "N. 1 - A"]));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].raw_name_text, "A");
        assert_eq!(out.orphan_lines.len(), 1);
        assert_eq!(out.orphan_lines[0].text, "Relatório de pesquisa de preço");
    }

    #[test]
    fn test_record_spans_page_break() {
        let input = vec![
            RawLine {
                page_number: 1,
                line_index: 40,
                text: "N. 8 - Papelaria Cen".into(),
            },
            RawLine {
                page_number: 2,
                line_index: 0,
                text: "tral Ltda".into(),
            },
        ];
        let out = build_records(&input);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].raw_name_text, "Papelaria Cen tral Ltda");
        assert_eq!(out.records[0].page_number, 1);
    }

    #[test]
    fn test_catalog_code_attached_and_reset() {
        let out = build_records(&lines(&[
            "Item 1",
            "461342 - CANETA ESFEROGRÁFICA",
            "N. 1 - A",
            "Item 2",
            "N. 2 - B",
        ]));
        assert_eq!(out.records[0].catalog_code.as_deref(), Some("461342"));
        assert_eq!(out.records[0].raw_name_text, "A");
        assert_eq!(out.records[1].catalog_code, None);
    }

    #[test]
    fn test_catalog_line_does_not_extend_previous_group_record() {
        let out = build_records(&lines(&[
            "Item 1",
            "N. 1 - A",
            "Item 2",
            "150012 - PAPEL A4",
            "N. 2 - B",
        ]));
        assert_eq!(out.records[0].raw_name_text, "A");
        assert_eq!(out.records[1].catalog_code.as_deref(), Some("150012"));
    }

    #[test]
    fn test_unspaced_catalog_line_does_not_extend_previous_group_record() {
        let out = build_records(&lines(&[
            "Item 1",
            "N. 1 - A",
            "Item 2",
            "461342-CANETA",
            "N. 2 - B",
        ]));
        assert_eq!(out.records[0].raw_name_text, "A");
        assert_eq!(out.records[1].catalog_code.as_deref(), Some("461342"));
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        let out = build_records(&[]);
        assert!(out.records.is_empty());
        assert!(out.orphan_lines.is_empty());
    }

    #[test]
    fn test_incremental_push_matches_fold() {
        let input = lines(&["Item 5", "N. 1 - A", "b"]);
        let mut builder = RecordBuilder::new();
        for line in &input {
            builder.push_line(line);
        }
        assert!(builder.has_open_record());
        let out = builder.finish();
        assert_eq!(out.records, build_records(&input).records);
    }
}
