//! Integration tests for financial table processing.

use sechtml::{
    Alignment, ColumnWidthConfig, ColumnWidthOptimizer, ParseOptions, ProcessedTable, Sechtml,
    TableConfig,
};

const INCOME_STATEMENT: &str = r#"<html><body><table><tr><td></td><td colspan="2">Years Ended December 31,</td></tr><tr><td></td><td>2023</td><td>2022</td></tr><tr><td>Net sales</td><td>383,285</td><td>394,328</td></tr><tr><td>Cost of sales</td><td>(214,137)</td><td>(223,546)</td></tr></table></body></html>"#;

fn process_first(html: &str) -> ProcessedTable {
    let doc = sechtml::parse_html_with_options(html, ParseOptions::new().without_page_breaks())
        .expect("fixture has a body");
    doc.process_tables(&TableConfig::default(), false)
        .into_iter()
        .next()
        .flatten()
        .expect("fixture has a non-empty table")
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

#[test]
fn test_period_header_table() {
    let table = process_first(INCOME_STATEMENT);

    assert_eq!(
        table.header,
        Some(strings(&["", "2023", "Years Ended December 31,\n2022"]))
    );
    assert_eq!(
        table.data_rows,
        vec![
            strings(&["Net sales", "383,285", "394,328"]),
            strings(&["Cost of sales", "-214,137", "-223,546"]),
        ]
    );
    assert_eq!(
        table.alignments,
        vec![Alignment::Left, Alignment::Right, Alignment::Right]
    );
}

#[test]
fn test_misaligned_header_shifted() {
    let table = process_first(
        r#"<html><body><table><tr><td></td><td>2023</td><td>2022</td></tr><tr><td>Revenue</td><td></td><td>1,200</td><td>1,100</td></tr><tr><td>Net income</td><td></td><td>300</td><td>250</td></tr></table></body></html>"#,
    );

    assert_eq!(table.header, Some(strings(&["", "", "2023", "2022"])));
    assert_eq!(table.data_rows[0], strings(&["Revenue", "", "1,200", "1,100"]));
    assert_eq!(
        table.alignments,
        vec![Alignment::Left, Alignment::Left, Alignment::Right, Alignment::Right]
    );
}

#[test]
fn test_dollar_row_ends_header() {
    let table = process_first(
        r#"<html><body><table><tr><td></td><td>Amount</td></tr><tr><td></td><td>$</td></tr><tr><td>Revenue</td><td>500</td></tr></table></body></html>"#,
    );

    assert_eq!(table.header, Some(strings(&["", "Amount"])));
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.data_rows[0], strings(&["", "$"]));
}

#[test]
fn test_spacer_columns_removed() {
    let table = process_first(
        r#"<html><body><table><tr><td></td><td>Revenue</td><td></td><td>100</td><td></td></tr><tr><td></td><td>Cost</td><td></td><td>(40)</td><td></td></tr></table></body></html>"#,
    );

    assert!(table.header.is_none());
    assert_eq!(
        table.data_rows,
        vec![strings(&["Revenue", "100"]), strings(&["Cost", "-40"])]
    );
}

#[test]
fn test_rows_are_rectangular() {
    let table = process_first(INCOME_STATEMENT);
    let width = table.column_count();

    assert!(table.all_rows().all(|row| row.len() == width));
}

#[test]
fn test_blank_table_is_skipped() {
    let doc = sechtml::parse_html(
        "<html><body><table><tr><td>&nbsp;</td><td></td></tr></table><p>Text</p></body></html>",
    )
    .unwrap();
    assert!(doc
        .process_tables(&TableConfig::default(), true)
        .iter()
        .all(Option::is_none));
}

#[test]
fn test_width_optimizer_on_parsed_table() {
    let table = process_first(INCOME_STATEMENT);
    let sized = ColumnWidthOptimizer::default().optimize(&table);

    assert_eq!(sized.widths, vec![13, 15, 24]);
    assert_eq!(sized.total_width(), 52);
}

#[test]
fn test_width_optimizer_narrow_budget() {
    let table = process_first(INCOME_STATEMENT);
    let optimizer = ColumnWidthOptimizer::new(ColumnWidthConfig::default().with_budget(40));
    let sized = optimizer.optimize(&table);

    assert_eq!(sized.widths, vec![13, 15, 18]);
    let header = sized.table.header.as_ref().unwrap();
    assert_eq!(header[2], "Years Ended December 31,\n2022");
}

#[test]
fn test_builder_sized_tables() {
    let result = Sechtml::new()
        .sequential()
        .with_width_budget(40)
        .parse_bytes(INCOME_STATEMENT.as_bytes())
        .unwrap()
        .unwrap();

    let sized = result.sized_tables();
    assert_eq!(sized.len(), 1);
    assert_eq!(sized[0].as_ref().unwrap().widths, vec![13, 15, 18]);
}
