use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nettirely::{Document, Message, Roster};
use serde_json::json;

// Roster bookkeeping runs on every inbound line before dispatch, so it sits
// on the hot path of busy channels.

fn names_reply(channel: &str, count: usize) -> Message {
    let names: Vec<String> = (0..count)
        .map(|i| match i % 3 {
            0 => format!("@op{i}"),
            1 => format!("+voice{i}"),
            _ => format!("user{i}"),
        })
        .collect();
    Message::parse(&format!(":irc.server.net 353 bot = {channel} :{}", names.join(" "))).unwrap()
}

fn roster_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("roster");
    group.throughput(Throughput::Elements(1));

    let names = names_reply("#busy", 500);
    group.bench_function("merge_500_names", |b| {
        b.iter_batched(
            Roster::new,
            |roster| {
                roster.apply(black_box(&names), "bot");
                roster
            },
            BatchSize::SmallInput,
        )
    });

    let roster = Roster::new();
    for i in 0..20 {
        roster.apply(&names_reply(&format!("#chan{i}"), 200), "bot");
    }
    let quit = Message::parse(":user2!u@h QUIT :bye").unwrap();
    let join = Message::parse(":user2!u@h JOIN #chan0").unwrap();
    group.bench_function("quit_across_20_channels", |b| {
        b.iter(|| {
            roster.apply(black_box(&quit), "bot");
            roster.apply(black_box(&join), "bot");
        })
    });

    group.finish();
}

fn document_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");

    let dir = tempfile::tempdir().unwrap();
    let mut doc = Document::empty(dir.path().join("state.json"));
    for i in 0..1000 {
        doc.insert(format!("factoid{i}"), json!({ "text": "x".repeat(64), "hits": i }));
    }

    group.bench_function("save_1000_keys", |b| b.iter(|| doc.save().unwrap()));

    group.finish();
}

criterion_group!(benches, roster_benchmark, document_benchmark);
criterion_main!(benches);
