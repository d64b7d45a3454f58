use chrono::{Duration, NaiveDate};

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

    /// Uniform index in `0..n`.
    fn index(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

/// Countries with relative order volume.
const COUNTRIES: &[(&str, f64)] = &[
    ("US", 0.30),
    ("DE", 0.18),
    ("FR", 0.15),
    ("GB", 0.12),
    ("ES", 0.10),
    ("PT", 0.08),
    ("NL", 0.07),
];

const BRANDS: &[&str] = &[
    "Acme", "Borealis", "Cascade", "Dune", "Everly", "Fable", "Glacier",
    "Harbor", "Ivory", "Juniper", "Kestrel", "Lumen", "Meridian", "Nimbus",
    "Orchid", "Pinnacle",
];

fn pick_country(rng: &mut SimpleRng) -> &'static str {
    let roll = rng.next_f64();
    let mut acc = 0.0;
    for &(code, weight) in COUNTRIES {
        acc += weight;
        if roll < acc {
            return code;
        }
    }
    COUNTRIES[COUNTRIES.len() - 1].0
}

/// Draw a basket: usually 1–2 brands, occasionally up to 5, skewed toward
/// the front of the brand list so popularity and co-occurrence have shape.
fn pick_brands(rng: &mut SimpleRng) -> Vec<&'static str> {
    let size = match rng.next_f64() {
        r if r < 0.35 => 1,
        r if r < 0.70 => 2,
        r if r < 0.90 => 3,
        r if r < 0.97 => 4,
        _ => 5,
    };
    let mut brands = Vec::with_capacity(size);
    while brands.len() < size {
        // Squaring the roll biases toward low indices (popular brands).
        let roll = rng.next_f64();
        let idx = ((roll * roll) * BRANDS.len() as f64) as usize % BRANDS.len();
        if !brands.contains(&BRANDS[idx]) {
            brands.push(BRANDS[idx]);
        }
    }
    brands
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let n_orders = 2000;
    let first_day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let day_span = 365;

    let output_path = "cross_selling_sample.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record(["orderId", "shipCountryCode", "brands", "orderDate"])
        .expect("Failed to write header");

    for order_id in 0..n_orders {
        let country = pick_country(&mut rng);
        let brands = pick_brands(&mut rng).join(",");
        let date = first_day + Duration::days(rng.index(day_span) as i64);

        writer
            .write_record([
                order_id.to_string(),
                country.to_string(),
                brands,
                date.to_string(),
            ])
            .expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_orders} orders to {output_path}");
}
