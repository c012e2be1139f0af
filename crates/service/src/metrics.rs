use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

// Incremented once per registration settlement.
pub static PAYMENTS_SETTLED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "roborumble_payments_settled_total",
        "Registrations settled by gateway verification or manual approval"
    )
    .expect("register payments_settled_total")
});

pub fn init() {
    Lazy::force(&PAYMENTS_SETTLED_TOTAL);
}
