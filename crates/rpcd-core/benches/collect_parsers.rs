//! Criterion benchmarks for the line parsers in `rpcd-core`.
//!
//! Inputs are synthetic tables shaped like the real proc files, so these
//! run deterministically without touching the host.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rpcd_core::collect::conntrack::parse_conntrack_table;
use rpcd_core::collect::leases::parse_dnsmasq_leases;
use rpcd_core::collect::process::parse_top_output;
use rpcd_core::collect::routes::{parse_route6_table, parse_route_table};

const CONNTRACK_LINE: &str = "ipv4     2 tcp      6 7440 ESTABLISHED src=192.168.1.10 dst=1.1.1.1 sport=51000 dport=443 packets=10 bytes=100 src=1.1.1.1 dst=192.168.1.10 sport=443 dport=51000 packets=20 bytes=200 [ASSURED] mark=0 use=2\n";
const TOP_LINE: &str = "  878     1 root     S <   1060   1%   0% /sbin/ubusd -s /var/run/ubus.sock\n";
const ROUTE_LINE: &str = "br-lan\t0001A8C0\t00000000\t0001\t0\t0\t0\t00FFFFFF\t0\t0\t0\n";
const ROUTE6_LINE: &str = "fd000000000000000000000000000000 40 00000000000000000000000000000000 00 00000000000000000000000000000000 00000400 00000001 00000000 00000001     br-lan\n";
const LEASE_LINE: &str = "1700003600 00:11:22:33:44:55 192.168.1.10 laptop 01:00:11:22:33:44:55\n";

fn table(header: &str, line: &str, rows: usize) -> String {
    let mut out = String::with_capacity(header.len() + line.len() * rows);
    out.push_str(header);
    for _ in 0..rows {
        out.push_str(line);
    }
    out
}

fn bench_conntrack(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_parsers/conntrack");
    for rows in [16, 1024] {
        let content = table("", CONNTRACK_LINE, rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &content, |b, input| {
            b.iter(|| black_box(parse_conntrack_table(black_box(input))));
        });
    }
    group.finish();
}

fn bench_top(c: &mut Criterion) {
    let content = table("  PID  PPID USER     STAT   VSZ %VSZ %CPU COMMAND\n", TOP_LINE, 200);
    c.bench_function("collect_parsers/top", |b| {
        b.iter(|| black_box(parse_top_output(black_box(&content))))
    });
}

fn bench_routes(c: &mut Criterion) {
    let v4 = table("Iface\tDestination\tGateway\tFlags\n", ROUTE_LINE, 64);
    let v6 = table("", ROUTE6_LINE, 64);

    c.bench_function("collect_parsers/route", |b| {
        b.iter(|| black_box(parse_route_table(black_box(&v4))))
    });
    c.bench_function("collect_parsers/ipv6_route", |b| {
        b.iter(|| black_box(parse_route6_table(black_box(&v6))))
    });
}

fn bench_leases(c: &mut Criterion) {
    let content = table("", LEASE_LINE, 256);
    c.bench_function("collect_parsers/dnsmasq_leases", |b| {
        b.iter(|| black_box(parse_dnsmasq_leases(black_box(&content), 1_700_000_000)))
    });
}

criterion_group!(benches, bench_conntrack, bench_top, bench_routes, bench_leases);
criterion_main!(benches);
