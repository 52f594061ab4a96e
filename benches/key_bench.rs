//! Benchmarks for key normalization and payload projection.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use champ_stats_cache::keys::{normalize_champion_id, StatsKey};
use champ_stats_cache::stats::StatsPayload;
use champ_stats_cache::upstream::{RawChampionStats, RawStatsResponse};

const NAMES: &[&str] = &[
    "ahri", "Kha'Zix", "wukong", "Nunu & Willump", "Dr. Mundo", "LEE SIN", "jarvaniv",
    "Renata Glasc", "miss fortune", "tahmkench",
];

fn bench_normalize_champion(c: &mut Criterion) {
    c.bench_function("normalize_champion_id_10", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(normalize_champion_id(black_box(name)));
            }
        })
    });
}

fn bench_stats_key(c: &mut Criterion) {
    c.bench_function("stats_key_filtered", |b| {
        b.iter(|| {
            let key = StatsKey::new(
                black_box(Some("14.1.1")),
                black_box("plat"),
                black_box("EUW1"),
                black_box(Some("middle")),
                black_box(Some("kha'zix")),
            );
            black_box(key);
        })
    });
}

fn bench_project(c: &mut Criterion) {
    // 170 champions spread across the five roles.
    let roles = ["top", "jungle", "mid", "adc", "support"];
    let raw: RawStatsResponse = (0..170u64)
        .map(|i| {
            let stats = RawChampionStats {
                games: Some(1_000 + i * 10),
                wins: Some(500 + i * 5),
                pick_rate: Some((i % 12) as f64),
                role: Some(roles[(i % 5) as usize].to_string()),
                ..Default::default()
            };
            (format!("Champion{i}"), stats)
        })
        .collect();
    let payload = StatsPayload::from_upstream(&raw);

    c.bench_function("project_role_from_170", |b| {
        b.iter(|| black_box(payload.project(black_box(Some("mid")), None)))
    });

    c.bench_function("project_champion_from_170", |b| {
        b.iter(|| black_box(payload.project(None, black_box(Some("Champion42")))))
    });
}

criterion_group!(benches, bench_normalize_champion, bench_stats_key, bench_project);
criterion_main!(benches);
