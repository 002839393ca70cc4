use criterion::{Criterion, black_box, criterion_group, criterion_main};

use lexicon_auth::{GrantMatrix, Role, Subject, TokenCodec, default_token_ttl};
use lexicon_core::UserId;

fn bench_issue(c: &mut Criterion) {
    let codec = TokenCodec::new("bench-signing-key", "lexicon-bench").unwrap();
    let subject = Subject::user(&UserId::from_raw("bench-user"));

    c.bench_function("token_issue", |b| {
        b.iter(|| codec.issue(black_box(&subject), default_token_ttl()).unwrap())
    });
}

fn bench_verify(c: &mut Criterion) {
    let codec = TokenCodec::new("bench-signing-key", "lexicon-bench").unwrap();
    let token = codec
        .issue(&Subject::user(&UserId::from_raw("bench-user")), default_token_ttl())
        .unwrap();

    c.bench_function("token_verify", |b| b.iter(|| codec.verify(black_box(&token)).unwrap()));

    let mut tampered = token.clone();
    tampered.push('x');
    c.bench_function("token_verify_tampered", |b| {
        b.iter(|| codec.verify(black_box(&tampered)).unwrap_err())
    });
}

fn bench_grant_lookup(c: &mut Criterion) {
    c.bench_function("grant_matrix_lookup", |b| {
        b.iter(|| GrantMatrix::for_role_name(black_box("editor")).len() + GrantMatrix::for_role(Role::Viewer).len())
    });
}

criterion_group!(benches, bench_issue, bench_verify, bench_grant_lookup);
criterion_main!(benches);
