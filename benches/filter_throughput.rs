//! Filter engine throughput.
//!
//! Benchmarks the streaming filter on synthetic replies:
//! - Channel counts: 100, 1000, 10000
//! - Roughly half of the channels match the predicate
//!
//! Run with: cargo bench --bench filter_throughput
//! Results saved to: target/criterion/

use std::fmt::Write;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use netconf_client::filter::{FilterSpec, apply};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const CHANNEL_COUNTS: &[usize] = &[100, 1_000, 10_000];

const FILTER: &str =
    "/rpc-reply/data/terminal-device/logical-channels/channel[start-with(index,'10115')]";

// ============================================================================
// Fixtures
// ============================================================================

fn synthetic_reply(channels: usize) -> String {
    let mut xml = String::from(
        "<rpc-reply message-id=\"101\"><data>\
         <terminal-device xmlns=\"http://openconfig.net/yang/terminal-device\">\
         <logical-channels>\n",
    );

    for i in 0..channels {
        let prefix = if i % 2 == 0 { "10115" } else { "20000" };
        let _ = writeln!(
            xml,
            "<channel><index>{prefix}-{i}</index><config><index>{prefix}-{i}</index>\
             <description>channel {i}</description><admin-state>ENABLED</admin-state>\
             </config></channel>"
        );
    }

    xml.push_str("</logical-channels></terminal-device></data></rpc-reply>]]>]]>");
    xml
}

// ============================================================================
// Benchmark: Filter Apply
// ============================================================================

fn bench_filter_apply(c: &mut Criterion) {
    let spec = FilterSpec::parse(FILTER).expect("valid filter");

    let mut group = c.benchmark_group("filter_apply");

    for &count in CHANNEL_COUNTS {
        let reply = synthetic_reply(count);
        group.throughput(Throughput::Bytes(reply.len() as u64));
        group.bench_with_input(BenchmarkId::new("channels", count), &reply, |b, reply| {
            b.iter(|| apply(reply, &spec).expect("filter"));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Expression Parse
// ============================================================================

fn bench_filter_parse(c: &mut Criterion) {
    c.bench_function("filter_parse", |b| {
        b.iter(|| FilterSpec::parse(FILTER).expect("valid filter"));
    });
}

criterion_group!(benches, bench_filter_apply, bench_filter_parse);
criterion_main!(benches);
