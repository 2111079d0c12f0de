//! Attribution benchmark
//!
//! Measures end-to-end throughput (parse, bind, attribute) over generated
//! projects, and the cost of printing an attributed unit back to text.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ktlst::driver::{DriverOptions, SourceText, attribute_sources};

const SERVICE_SOURCE: &str = r#"package app

import java.nio.ByteBuffer
import java.util.regex.Pattern

class Service ( val name : String ) {
    var count : Int ? = 0

    fun handle ( input : String ) : Int {
        val buffer = ByteBuffer . wrap ( input . toByteArray ( ) )
        val pattern = Pattern . compile ( ".*" )
        this . count = ( count ?: 0 ) + buffer . remaining ( )
        return this . count ?: Int . MIN_VALUE
    }

    companion object {
        val DEFAULT = "service"
    }
}
"#;

/// `units` files, each declaring a class that uses the previous file's class.
fn generate_project(units: usize, members: usize) -> Vec<SourceText> {
    (0..units)
        .map(|u| {
            let mut text = String::from("package gen\n\n");
            text.push_str(&format!("class Node{u} {{\n"));
            for m in 0..members {
                text.push_str(&format!("    val field{m} : Int ? = {m}\n"));
            }
            if u > 0 {
                text.push_str(&format!("    fun link ( other : Node{} ) : Int {{\n", u - 1));
                for m in 0..members {
                    text.push_str(&format!("        val v{m} = other . field{m} ?: this . field{m}\n"));
                }
                text.push_str("        return 0\n    }\n");
            }
            text.push_str("}\n");
            SourceText::new(format!("Node{u}.kt"), text)
        })
        .collect()
}

fn bench_attribute_service(c: &mut Criterion) {
    let sources = vec![SourceText::new("Service.kt", SERVICE_SOURCE)];
    let options = DriverOptions::default();
    c.bench_function("attribute_service", |b| {
        b.iter(|| attribute_sources(black_box(&sources), &options, None))
    });
}

fn bench_attribute_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("attribution_throughput");
    let options = DriverOptions::default();
    for units in [8usize, 64, 256] {
        let sources = generate_project(units, 16);
        let bytes: usize = sources.iter().map(|s| s.text.len()).sum();
        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(units), &sources, |b, sources| {
            b.iter(|| attribute_sources(black_box(sources), &options, None))
        });
    }
    group.finish();
}

fn bench_print(c: &mut Criterion) {
    let sources = generate_project(1, 256);
    let run = attribute_sources(&sources, &DriverOptions::default(), None);
    let Ok(run) = run else {
        return;
    };
    let unit = &run.units[0];
    let mut group = c.benchmark_group("printer");
    group.throughput(Throughput::Bytes(sources[0].text.len() as u64));
    group.bench_function("print_attributed_unit", |b| b.iter(|| black_box(unit.print())));
    group.finish();
}

criterion_group!(
    benches,
    bench_attribute_service,
    bench_attribute_throughput,
    bench_print
);
criterion_main!(benches);
