use criterion::{black_box, criterion_group, criterion_main, Criterion};
use watch_ssh::event::parse_line;
use watch_ssh::filter::IgnoreFilter;
use watch_ssh::registry::parse_process_line;

fn benchmark_parse_auth_lines(c: &mut Criterion) {
    let test_lines = vec![
        "Sep 18 02:00:01 host sshd[4821]: Accepted password for alice from 10.0.0.5 port 51234 ssh2",
        "Sep 18 02:00:02 host sshd[4822]: Accepted publickey for bob from 10.0.0.6 port 51235 ssh2: ED25519 SHA256:abc",
        "Sep 18 02:05:00 host sshd[4821]: pam_unix(sshd:session): session closed for user alice",
        "Sep 18 02:05:01 host CRON[5000]: pam_unix(cron:session): session opened for user root",
        "Sep 18 02:05:02 host sudo: alice : TTY=pts/0 ; PWD=/home/alice ; USER=root ; COMMAND=/bin/ls",
        "Sep 18 02:05:03 host sshd[4830]: Failed password for invalid user admin from 203.0.113.9 port 4242 ssh2",
    ];

    c.bench_function("parse_auth_lines", |b| {
        b.iter(|| {
            for line in &test_lines {
                black_box(parse_line(line));
            }
        })
    });
}

fn benchmark_parse_noise(c: &mut Criterion) {
    let long_line = "Sep 18 02:05:02 host kernel: [12345.678901] audit: type=1400 audit(1695000000.000:42): apparmor=\"DENIED\" operation=\"open\" profile=\"snap.example\" name=\"/proc/1/environ\" pid=4242 comm=\"example\" requested_mask=\"r\" denied_mask=\"r\" fsuid=1000 ouid=0";

    let test_lines = vec![long_line; 100];

    c.bench_function("parse_noise", |b| {
        b.iter(|| {
            for line in &test_lines {
                black_box(parse_line(line));
            }
        })
    });
}

fn benchmark_ignore_filter(c: &mut Criterion) {
    let filter = IgnoreFilter::new((0..100).map(|i| format!("user{}", i)));
    let usernames = ["user7", "user99", "alice", "root", "user42", "nobody"];

    c.bench_function("ignore_filter", |b| {
        b.iter(|| {
            for username in &usernames {
                black_box(filter.is_ignored(username));
            }
        })
    });
}

fn benchmark_parse_process_table(c: &mut Criterion) {
    let mut table = String::new();
    for pid in 1000..1200 {
        table.push_str(&format!(
            "root {} 1 0 02:00 ? 00:00:00 /usr/bin/worker --id {}\n",
            pid, pid
        ));
    }
    table.push_str("carol 4821 4815 0 02:00 ? 00:00:00 sshd: carol@10.0.0.5\n");

    c.bench_function("parse_process_table", |b| {
        b.iter(|| {
            black_box(
                table
                    .lines()
                    .filter_map(parse_process_line)
                    .collect::<Vec<_>>(),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_parse_auth_lines,
    benchmark_parse_noise,
    benchmark_ignore_filter,
    benchmark_parse_process_table
);
criterion_main!(benches);
