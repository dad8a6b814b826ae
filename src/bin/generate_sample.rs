use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

const HEADER: [&str; 16] = [
    "Transaction_ID",
    "Country",
    "Product",
    "Import_Export",
    "Quantity",
    "Value",
    "Date",
    "Category",
    "Port",
    "Customs_Code",
    "Weight",
    "Shipping_Method",
    "Supplier",
    "Customer",
    "Invoice_Number",
    "Payment_Terms",
];

const COUNTRIES: [&str; 6] = ["Chile", "Peru", "Japan", "Germany", "Kenya", "Canada"];
const PRODUCTS: [(&str, &str, f64); 6] = [
    ("Copper", "Metals", 9.0),
    ("Coffee", "Food", 4.5),
    ("Laptops", "Electronics", 850.0),
    ("Cotton", "Textiles", 2.2),
    ("Timber", "Raw Materials", 1.3),
    ("Turbines", "Machinery", 12000.0),
];
const PORTS: [&str; 5] = ["Valparaiso", "Callao", "Yokohama", "Hamburg", "Mombasa"];
const SHIPPING: [&str; 3] = ["Sea", "Air", "Land"];
const SUPPLIERS: [&str; 4] = ["Andes Trading", "Pacific Link", "Nordic Supply", "Savanna Goods"];
const CUSTOMERS: [&str; 4] = ["Osaka Works", "Berlin Retail", "Lima Foods", "Toronto Tech"];
const PAYMENT: [&str; 4] = ["Net 30", "Net 60", "Prepaid", "Cash on Delivery"];

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = 2_000;
    let first_day = NaiveDate::from_ymd_opt(2019, 1, 1).context("invalid start date")?;
    let span_days = 5 * 365;

    let output_path = "sample_trades.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADER)?;

    for id in 0..rows {
        let &(product, category, unit_price) = rng.pick(&PRODUCTS);
        let quantity = rng.range(1.0, 5_000.0).round();
        let value = (quantity * unit_price * rng.range(0.8, 1.2) * 100.0).round() / 100.0;
        let weight = (quantity * rng.range(0.2, 3.0) * 100.0).round() / 100.0;

        // Roughly one row in a hundred carries a date that cannot be parsed.
        let date = if rng.next_f64() < 0.01 {
            "unknown".to_string()
        } else {
            let offset = (rng.next_u64() % span_days) as i64;
            (first_day + Duration::days(offset)).format("%d-%m-%Y").to_string()
        };

        writer.write_record([
            format!("T{id:05}"),
            rng.pick(&COUNTRIES).to_string(),
            product.to_string(),
            rng.pick(&["Import", "Export"]).to_string(),
            quantity.to_string(),
            value.to_string(),
            date,
            category.to_string(),
            rng.pick(&PORTS).to_string(),
            format!("{:06}", rng.next_u64() % 1_000_000),
            weight.to_string(),
            rng.pick(&SHIPPING).to_string(),
            rng.pick(&SUPPLIERS).to_string(),
            rng.pick(&CUSTOMERS).to_string(),
            format!("INV{:07}", rng.next_u64() % 10_000_000),
            rng.pick(&PAYMENT).to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV writer")?;

    println!("Wrote {rows} trade records to {output_path}");
    Ok(())
}
