//! Writes a deliberately messy sales table to `sample_data.csv` and
//! `sample_data.parquet` for trying out the wrangling operations.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct SaleRow {
    customer: String,
    city: Option<String>,
    product: String,
    amount: Option<String>,
    quantity: Option<f64>,
    paid: bool,
}

const FIRST_NAMES: [&str; 6] = ["Budi", "Siti", "Agus", "Dewi", "Rina", "Joko"];
const LAST_NAMES: [&str; 5] = ["Santoso", "Wijaya", "Hartono", "Lestari", "Pratama"];
const CITIES: [&str; 4] = ["Jakarta", "Bandung", "Surabaya", "Medan"];
const PRODUCTS: [&str; 4] = ["Kopi", "Teh", "Gula", "Beras"];

fn generate_rows(rng: &mut SimpleRng, n: usize) -> Vec<SaleRow> {
    let mut rows = Vec::with_capacity(n);
    for _ in 0..n {
        // "Last, First" so split-text has something to do
        let customer = format!("{}, {}", rng.pick(&LAST_NAMES), rng.pick(&FIRST_NAMES));

        let city = (!rng.chance(0.1)).then(|| {
            let city = rng.pick(&CITIES);
            match rng.next_u64() % 4 {
                0 => format!("  {city} "),
                1 => city.to_uppercase(),
                _ => city.to_string(),
            }
        });

        let amount = (!rng.chance(0.08)).then(|| {
            let value = 50.0 + (rng.next_f64() * 2000.0).round();
            if value >= 1000.0 {
                // thousands separator, loaded as text
                let v = value as u64;
                format!("{},{:03}", v / 1000, v % 1000)
            } else {
                format!("{value}")
            }
        });

        let quantity = (!rng.chance(0.05)).then(|| (1 + rng.next_u64() % 12) as f64);

        rows.push(SaleRow {
            customer,
            city,
            product: rng.pick(&PRODUCTS).to_string(),
            amount,
            quantity,
            paid: rng.chance(0.7),
        });

        // exact duplicates for drop-duplicates
        if rng.chance(0.05) {
            if let Some(last) = rows.last() {
                let dup = SaleRow {
                    customer: last.customer.clone(),
                    city: last.city.clone(),
                    product: last.product.clone(),
                    amount: last.amount.clone(),
                    quantity: last.quantity,
                    paid: last.paid,
                };
                rows.push(dup);
            }
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[SaleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["customer", "city", "product", "amount", "quantity", "paid"])?;
    for row in rows {
        let quantity = row.quantity.map(|q| q.to_string()).unwrap_or_default();
        writer.write_record([
            row.customer.as_str(),
            row.city.as_deref().unwrap_or(""),
            row.product.as_str(),
            row.amount.as_deref().unwrap_or("NA"),
            quantity.as_str(),
            if row.paid { "true" } else { "false" },
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(rows: &[SaleRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("customer", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, true),
        Field::new("product", DataType::Utf8, false),
        Field::new("amount", DataType::Utf8, true),
        Field::new("quantity", DataType::Float64, true),
        Field::new("paid", DataType::Boolean, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.customer.as_str()))),
        Arc::new(rows.iter().map(|r| r.city.as_deref()).collect::<StringArray>()),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.product.as_str()))),
        Arc::new(rows.iter().map(|r| r.amount.as_deref()).collect::<StringArray>()),
        Arc::new(rows.iter().map(|r| r.quantity).collect::<Float64Array>()),
        Arc::new(rows.iter().map(|r| Some(r.paid)).collect::<BooleanArray>()),
    ];

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn write_parquet(path: &str, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 200);

    write_csv("sample_data.csv", &rows)?;

    let batch = to_batch(&rows)?;
    write_parquet("sample_data.parquet", &batch)?;

    print_batches(&[batch.slice(0, batch.num_rows().min(8))])?;
    println!(
        "Wrote {} rows to sample_data.csv and sample_data.parquet",
        rows.len()
    );
    Ok(())
}
