use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fhirmap_map::{MappingMetadata, ValueHints};
use fhirmap_model::{
    FieldOutcome, FieldStatus, IssueSeverity, MappingSuggestion, PotentialMapping,
    ValidationIssue,
};
use fhirmap_standards::PatternRule;

pub fn mappings_table(mappings: &[PotentialMapping]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source field"),
        header_cell("Type"),
        header_cell("Target path"),
        header_cell("Target type"),
        header_cell("Confidence"),
        header_cell("Transform"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    let mut previous: Option<&str> = None;
    for mapping in mappings {
        // later candidates for the same field are dimmed
        let first = previous != Some(mapping.source_property.as_str());
        previous = Some(mapping.source_property.as_str());
        let field_cell = if first {
            Cell::new(&mapping.source_property)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        } else {
            dim_cell("")
        };
        let target_cell = if mapping.is_unknown() {
            dim_cell(&mapping.target_fhir_path)
        } else if first {
            Cell::new(&mapping.target_fhir_path)
        } else {
            dim_cell(&mapping.target_fhir_path)
        };
        table.add_row(vec![
            field_cell,
            Cell::new(&mapping.source_type),
            target_cell,
            Cell::new(mapping.target_fhir_type.as_str()),
            confidence_cell(mapping.confidence),
            flag_cell(mapping.transformation_needed),
        ]);
    }
    table
}

pub fn value_hints_table(hints: &ValueHints) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source field"),
        header_cell("Source value"),
        header_cell("Target value"),
        header_cell("System"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for (field, candidates) in hints {
        for candidate in candidates {
            let mapping = &candidate.value_mapping;
            table.add_row(vec![
                Cell::new(field),
                Cell::new(&mapping.source_value),
                Cell::new(&mapping.target_value),
                optional_cell(mapping.target_system.as_deref()),
                confidence_cell(candidate.confidence),
            ]);
        }
    }
    table
}

pub fn outcomes_table(outcomes: &[FieldOutcome]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source field"),
        header_cell("Target path"),
        header_cell("Status"),
        header_cell("Reason"),
    ]);
    apply_summary_table_style(&mut table);
    for outcome in outcomes {
        table.add_row(vec![
            Cell::new(&outcome.source_field),
            Cell::new(&outcome.target_fhir_path),
            status_cell(&outcome.status),
            optional_cell(outcome.status.reason()),
        ]);
    }
    table
}

pub fn issues_table(issues: &[ValidationIssue]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Path"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for issue in issues {
        table.add_row(vec![
            severity_cell(issue.severity),
            optional_cell(issue.path.as_deref()),
            Cell::new(&issue.message),
        ]);
    }
    table
}

pub fn suggestions_table(suggestions: &[MappingSuggestion]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Target path"),
        header_cell("Message"),
        header_cell("Try source fields"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for suggestion in suggestions {
        table.add_row(vec![
            severity_cell(suggestion.severity),
            Cell::new(&suggestion.target_path),
            Cell::new(&suggestion.message),
            Cell::new(suggestion.suggested_source_fields.join(", ")),
        ]);
    }
    table
}

pub fn patterns_table(rules: &[(&str, &PatternRule)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Resource"),
        header_cell("Pattern"),
        header_cell("Target path"),
        header_cell("Type"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for (resource_type, rule) in rules {
        table.add_row(vec![
            Cell::new(resource_type)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(rule.regex_pattern),
            Cell::new(rule.target_path),
            Cell::new(rule.target_data_type),
            confidence_cell(rule.confidence),
        ]);
    }
    table
}

pub fn stored_table(stored: &[MappingMetadata]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Resource"),
        header_cell("Fields"),
        header_cell("Profile"),
        header_cell("Saved"),
        header_cell("File"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for metadata in stored {
        table.add_row(vec![
            Cell::new(&metadata.resource_type)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(metadata.field_count),
            optional_cell(metadata.profile.as_deref()),
            optional_cell(metadata.saved_at.as_deref()),
            Cell::new(metadata.file_path.display()),
        ]);
    }
    table
}

/// Applied/skipped/failed totals for one or more mapped records.
pub fn totals_line(applied: usize, skipped: usize, failed: usize) -> String {
    format!("Applied: {applied}  Skipped: {skipped}  Failed: {failed}")
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

/// Framed style for the single summary table of a command.
fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: &FieldStatus) -> Cell {
    let cell = Cell::new(status.label());
    match status {
        FieldStatus::Applied => cell.fg(Color::Green),
        FieldStatus::SkippedCoercion { .. } | FieldStatus::SkippedUnsupportedPath { .. } => {
            cell.fg(Color::Yellow)
        }
        FieldStatus::SkippedMissing | FieldStatus::SkippedNull => cell.fg(Color::DarkGrey),
        FieldStatus::Failed { .. } => cell.fg(Color::Red).add_attribute(Attribute::Bold),
    }
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    match severity {
        IssueSeverity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        IssueSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
        IssueSeverity::Info => Cell::new("INFO").fg(Color::Cyan),
    }
}

fn confidence_cell(confidence: f64) -> Cell {
    let cell = Cell::new(format!("{confidence:.2}"));
    if confidence >= 0.8 {
        cell.fg(Color::Green)
    } else if confidence >= 0.5 {
        cell.fg(Color::Yellow)
    } else {
        cell.fg(Color::DarkGrey)
    }
}

fn flag_cell(flag: bool) -> Cell {
    if flag {
        Cell::new("✓").fg(Color::Yellow)
    } else {
        dim_cell("-")
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(text) => Cell::new(text),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
