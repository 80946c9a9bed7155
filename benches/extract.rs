// benches/extract.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use uvr_scrape::{
    scrape::combine_html_xml,
    specs::{fragments::extract_fragments, schema::{read_schema, ConfigTree}},
    value::separate,
};

fn load_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
}

/// One big synthetic page: `n` positioned values of mixed kinds.
fn synthetic_page(n: usize) -> String {
    let samples = ["61,9 °C", "EIN", "-59,4 kWh", "312 l/h", "<a>AUTO<br>0,0 %</a>", "− 5,0 °C", "AUS"];
    let mut html = String::from("<html><body>");
    for i in 0..n {
        html.push_str(&format!(r#"<div id="pos{i}"><a>{}</a></div>"#, samples[i % samples.len()]));
    }
    html.push_str("</body></html>");
    html
}

fn bench_extract(c: &mut Criterion) {
    let fragments = ["61,9 °C", "0,0 %", "EIN", "AUTO", "-59,4 kWh", "\u{2212} 5,0 °C", "640 W/m²"];
    c.bench_function("separate", |b| {
        b.iter(|| {
            for f in fragments {
                black_box(separate(black_box(f)));
            }
        })
    });

    let page = load_fixture("page1.html");
    c.bench_function("extract_fragments_fixture", |b| {
        b.iter(|| black_box(extract_fragments(black_box(&page)).len()))
    });

    let big = synthetic_page(200);
    c.bench_function("extract_fragments_200", |b| {
        b.iter(|| black_box(extract_fragments(black_box(&big)).len()))
    });

    let export = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/Neu.xml");
    let tree = ConfigTree::load(&export).expect("fixture export");
    let schema = read_schema(&tree, 1).expect("page 1 schema");
    let set = extract_fragments(&page);
    c.bench_function("combine_html_xml", |b| {
        b.iter(|| black_box(combine_html_xml(black_box(&schema), black_box(&set)).result.len()))
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
