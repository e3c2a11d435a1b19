use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use market_melody::audio::RecordingSynth;
use market_melody::engine::session::{SessionOptions, SessionState};
use market_melody::engine::types::Quote;
use market_melody::market_data::normaliser::normalize;

const RAW: &str = r#"{"u":400900217,"s":"BNBUSDT","b":"25.35190000","B":"31.21000000",
                     "a":"25.36520000","A":"40.66000000"}"#;

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_book_ticker", |b| b.iter(|| normalize(black_box(RAW))));
}

fn bench_on_quote(c: &mut Criterion) {
    c.bench_function("session_on_quote_full_window", |b| {
        let rng = StdRng::seed_from_u64(3);
        let mut session = SessionState::with_rng("BNBUSDT", SessionOptions::default(), rng);
        let mut synth = RecordingSynth::default();
        let mut clock = 0.0;
        let mut qty = 1.0;
        b.iter(|| {
            clock += 0.2;
            qty += 0.75;
            let quote = Quote::new(25.35, qty, 25.36, qty * 0.5);
            let effects = session.on_quote(black_box(quote), clock, &mut synth);
            synth.notes.clear();
            effects
        })
    });
}

criterion_group!(benches, bench_normalize, bench_on_quote);
criterion_main!(benches);
