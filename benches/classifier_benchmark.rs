use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spamclf::{FeatureExtractor, Label, SpamClassifier};

fn corpus(size: usize) -> (Vec<String>, Vec<Label>) {
    let spam = [
        "Congratulations you won a free cruise, claim your prize now",
        "Urgent: your account has been selected for a cash reward",
        "Free entry in a weekly competition, text WIN to claim",
    ];
    let ham = [
        "Are we still meeting for lunch tomorrow",
        "I'll call you after the game tonight",
        "Following up on the notes from yesterday's meeting",
    ];
    (0..size)
        .map(|i| {
            if i % 4 == 0 {
                (format!("{} {}", spam[i % spam.len()], i), Label::Spam)
            } else {
                (format!("{} {}", ham[i % ham.len()], i), Label::Ham)
            }
        })
        .unzip()
}

fn setup_benchmark_classifier() -> SpamClassifier {
    let (texts, labels) = corpus(400);
    SpamClassifier::builder().fit(&texts, &labels).unwrap()
}

fn bench_vectorize(c: &mut Criterion) {
    let classifier = setup_benchmark_classifier();
    let mut group = c.benchmark_group("Vectorize");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("short_text", |b| b.iter(|| {
        classifier.vectorizer().transform(black_box("Free prize inside"))
    }));

    group.bench_function("long_text", |b| b.iter(|| {
        classifier.vectorizer().transform(black_box(
            "This is a much longer message that mentions a meeting, a free cruise, \
             a weekly competition and a cash reward, and it keeps going for a while \
             so that tokenisation and vocabulary lookups dominate the cost.",
        ))
    }));

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let classifier = setup_benchmark_classifier();
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("predict", |b| b.iter(|| {
        classifier.predict(black_box("Claim your free cash reward now"))
    }));

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("Training");
    group.sample_size(10);

    for &size in &[100usize, 1000] {
        let (texts, labels) = corpus(size);
        group.bench_function(format!("fit_{}", size), |b| b.iter(|| {
            SpamClassifier::builder().fit(black_box(&texts), &labels).unwrap()
        }));
    }

    group.finish();
}

criterion_group!(benches, bench_vectorize, bench_prediction, bench_training);
criterion_main!(benches);
