use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repository::memory::InMemoryAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::payments::gateway::{sign, signature_matches};

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(InMemoryAuthRepository::default());
    let svc = AuthService::new(
        repo,
        AuthConfig {
            jwt_secret: "secret".into(),
            token_ttl_hours: 168,
            admin_email: "admin@roborumble.com".into(),
            bootstrap_password: None,
        },
    );

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.register(RegisterInput {
        name: "Bench".into(),
        team_name: "Benchers".into(),
        email: "bench@example.com".into(),
        password: "Benchmark1".into(),
        college: "CSJMU".into(),
    }));

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let session = rt
                .block_on(svc.login(LoginInput { email: "bench@example.com".into(), password: "Benchmark1".into() }))
                .unwrap();
            svc.verify_token(&session.token).unwrap();
        });
    });
}

fn bench_signature(c: &mut Criterion) {
    let sig = sign("secret", "order_1", "pay_1").unwrap();
    c.bench_function("payment_signature_check", |b| {
        b.iter(|| assert!(signature_matches("secret", "order_1", "pay_1", &sig)));
    });
}

criterion_group!(benches, bench_login, bench_signature);
criterion_main!(benches);
