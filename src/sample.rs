//! Synthetic sample-data generation.
//!
//! Produces a customer dataset shaped like a typical CRM export so the full
//! pipeline (classification, clustering, trend bucketing) can be exercised
//! without a real upload. Spending is drawn from three tiers so clustering
//! has actual structure to find.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use crate::dataset::{Dataset, Value};

const FIRST_NAMES: [&str; 8] = [
    "Ada", "Bruno", "Clara", "Dmitri", "Elena", "Felix", "Grace", "Hugo",
];
const LAST_NAMES: [&str; 8] = [
    "Almeida", "Berg", "Chen", "Dubois", "Eriksen", "Fischer", "Garcia", "Hansen",
];

/// Days of signup history the generated dates span.
const HISTORY_DAYS: i64 = 540;

/// Generate `count` synthetic customer rows.
pub fn generate_sample(count: usize, rng: &mut StdRng) -> Dataset {
    let mut dataset = Dataset::new(vec![
        "email".to_string(),
        "name".to_string(),
        "age".to_string(),
        "total_amount".to_string(),
        "orders".to_string(),
        "created_at".to_string(),
    ]);

    let today = Utc::now().date_naive();
    for i in 0..count {
        let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
        let total_amount = spending_tier(rng);
        let orders = rng.gen_range(1..=40);
        let age = rng.gen_range(18..=75);
        let created = today - Duration::days(rng.gen_range(0..HISTORY_DAYS));

        dataset.push_row(vec![
            Value::Text(format!("customer{}@example.com", i + 1)),
            Value::Text(format!("{first} {last}")),
            Value::Number(f64::from(age)),
            Value::Number(total_amount),
            Value::Number(f64::from(orders)),
            Value::Text(created.format("%Y-%m-%d").to_string()),
        ]);
    }
    dataset
}

/// Tiered spending: mostly small baskets, a solid middle, a thin top end.
fn spending_tier(rng: &mut StdRng) -> f64 {
    let roll: f64 = rng.gen();
    let amount: f64 = if roll < 0.80 {
        rng.gen_range(20.0..500.0)
    } else if roll < 0.95 {
        rng.gen_range(500.0..2_000.0)
    } else {
        rng.gen_range(2_000.0..10_000.0)
    };
    (amount * 100.0).round() / 100.0
}
