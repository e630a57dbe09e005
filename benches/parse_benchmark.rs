//! Benchmarks for sechtml parsing performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic filing HTML shaped like a 10-K: styled
//! headings, prose, financial tables and page-break markers.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Creates a synthetic filing with the given number of pages.
fn create_test_filing(page_count: usize) -> String {
    let mut html = String::from(
        "<html><head><title>Form 10-K</title></head><body>\
         <p style=\"font-weight:bold;font-size:12pt;text-align:center\">PART I</p>",
    );

    for i in 0..page_count {
        html.push_str(&format!(
            "<p style=\"font-weight:bold;margin-top:12pt\">ITEM {}. Section {}</p>",
            i + 1,
            i + 1
        ));
        for _ in 0..4 {
            html.push_str(
                "<p style=\"margin-top:6pt;font-size:10pt\">The Company designs, manufactures \
                 and markets products and services. Net sales increased during the year \
                 due primarily to higher volumes.</p>",
            );
        }
        html.push_str(
            "<table><tr><td></td><td colspan=\"3\">Years Ended December 31,</td></tr>\
             <tr><td></td><td>2023</td><td></td><td>2022</td></tr>\
             <tr><td>Net sales</td><td>$</td><td>383,285</td><td>394,328</td></tr>\
             <tr><td>Cost of sales</td><td>$</td><td>(214,137)</td><td>(223,546)</td></tr>\
             </table>",
        );
        html.push_str("<hr style=\"page-break-after:always\"/>");
    }

    html.push_str("</body></html>");
    html
}

/// Benchmark format detection.
fn bench_format_detection(c: &mut Criterion) {
    let filing = create_test_filing(1);
    let binary = b"%PDF-1.7\n\x00\x01\x02";

    c.bench_function("detect_html", |b| {
        b.iter(|| sechtml::detect_format_from_bytes(black_box(filing.as_bytes())).unwrap());
    });

    c.bench_function("detect_binary", |b| {
        b.iter(|| sechtml::detect_format_from_bytes(black_box(binary)).is_err());
    });
}

/// Benchmark filing parsing at various sizes.
fn bench_filing_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("filing_parsing");

    for page_count in [1, 10, 50].iter() {
        let html = create_test_filing(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| sechtml::parse_html(black_box(&html)));
        });
    }

    group.finish();
}

/// Benchmark table processing, serial and parallel.
fn bench_table_processing(c: &mut Criterion) {
    let doc = sechtml::parse_html(&create_test_filing(50)).expect("synthetic filing has a body");
    let config = sechtml::TableConfig::default();

    c.bench_function("process_tables_serial", |b| {
        b.iter(|| doc.process_tables(black_box(&config), false));
    });

    c.bench_function("process_tables_parallel", |b| {
        b.iter(|| doc.process_tables(black_box(&config), true));
    });
}

/// Benchmark column width fitting.
fn bench_width_optimizer(c: &mut Criterion) {
    let doc = sechtml::parse_html(&create_test_filing(1)).expect("synthetic filing has a body");
    let tables = doc.process_tables(&sechtml::TableConfig::default(), false);
    let table = tables
        .into_iter()
        .flatten()
        .next()
        .expect("synthetic filing has a table");
    let optimizer = sechtml::ColumnWidthOptimizer::default();

    c.bench_function("optimize_widths", |b| {
        b.iter(|| optimizer.optimize(black_box(&table)));
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_filing_parsing,
    bench_table_processing,
    bench_width_optimizer,
);
criterion_main!(benches);
