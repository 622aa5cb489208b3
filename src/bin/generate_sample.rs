//! Write a synthetic housing dataset shaped like the Ames `train.csv`.
//!
//! `generate_sample [OUT]` writes Parquet by default, CSV when `OUT` ends
//! in `.csv`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 1460;

/// (code, price multiplier)
const NEIGHBORHOODS: &[(&str, f64)] = &[
    ("NAmes", 0.85),
    ("CollgCr", 1.10),
    ("OldTown", 0.70),
    ("Edwards", 0.72),
    ("Somerst", 1.25),
    ("Gilbert", 1.08),
    ("NridgHt", 1.75),
    ("Sawyer", 0.77),
    ("NWAmes", 1.05),
    ("SawyerW", 1.02),
    ("BrkSide", 0.70),
    ("Crawfor", 1.15),
    ("Mitchel", 0.87),
    ("NoRidge", 1.80),
    ("Timber", 1.35),
    ("IDOTRR", 0.56),
    ("ClearCr", 1.18),
    ("StoneBr", 1.70),
    ("SWISU", 0.78),
    ("MeadowV", 0.55),
    ("Blmngtn", 1.08),
    ("BrDale", 0.57),
    ("Veenker", 1.30),
    ("NPkVill", 0.77),
    ("Blueste", 0.75),
];
const GARAGE_TYPES: &[&str] = &["Attchd", "Detchd", "BuiltIn", "CarPort", "Basment", "2Types"];
const BLDG_TYPES: &[&str] = &["1Fam", "2fmCon", "Duplex", "TwnhsE", "Twnhs"];
const HOUSE_STYLES: &[&str] = &["1Story", "2Story", "1.5Fin", "SLvl", "SFoyer", "2.5Unf"];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    /// Pick with a bias towards the front of the slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let u = self.next_f64();
        &items[((u * u) * items.len() as f64) as usize % items.len()]
    }
}

/// Column vectors of the generated table.
#[derive(Default)]
struct Columns {
    id: Vec<i64>,
    neighborhood: Vec<String>,
    lot_frontage: Vec<Option<f64>>,
    overall_qual: Vec<i64>,
    year_built: Vec<i64>,
    year_remod_add: Vec<i64>,
    gr_liv_area: Vec<i64>,
    garage_type: Vec<Option<String>>,
    bldg_type: Vec<String>,
    house_style: Vec<String>,
    mo_sold: Vec<i64>,
    yr_sold: Vec<i64>,
    sale_price: Vec<i64>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for i in 0..ROWS {
        let &(hood, multiplier) = rng.pick(NEIGHBORHOODS);
        let year_built = rng.range(1880, 2009);
        let year_remod_add = if rng.next_f64() < 0.45 {
            rng.range(year_built.max(1950), 2010)
        } else {
            year_built
        };
        let qual = (rng.gauss(6.0, 1.4).round() as i64).clamp(1, 10);
        let area = rng.gauss(1500.0, 500.0).max(400.0).round() as i64;
        let age_penalty = (2010 - year_built) as f64 * 300.0;
        let price = (multiplier * (area as f64 * 75.0 + qual as f64 * 12_000.0) - age_penalty
            + rng.gauss(0.0, 18_000.0))
        .max(35_000.0)
        .round() as i64;

        cols.id.push(i as i64 + 1);
        cols.neighborhood.push(hood.to_string());
        cols.lot_frontage.push(if rng.next_f64() < 0.18 {
            None
        } else {
            Some(rng.gauss(70.0, 22.0).max(21.0).round())
        });
        cols.overall_qual.push(qual);
        cols.year_built.push(year_built);
        cols.year_remod_add.push(year_remod_add);
        cols.gr_liv_area.push(area);
        cols.garage_type.push(if rng.next_f64() < 0.055 {
            None
        } else {
            Some(rng.pick(GARAGE_TYPES).to_string())
        });
        cols.bldg_type.push(rng.pick(BLDG_TYPES).to_string());
        cols.house_style.push(rng.pick(HOUSE_STYLES).to_string());
        cols.mo_sold.push(rng.range(1, 12));
        cols.yr_sold.push(rng.range(2006, 2010));
        cols.sale_price.push(price);
    }
    cols
}

fn to_batch(cols: Columns) -> Result<RecordBatch> {
    let int = |name: &str| Field::new(name, DataType::Int64, false);
    let text = |name: &str, nullable: bool| Field::new(name, DataType::Utf8, nullable);

    let schema = Arc::new(Schema::new(vec![
        int("Id"),
        text("Neighborhood", false),
        Field::new("LotFrontage", DataType::Float64, true),
        int("OverallQual"),
        int("YearBuilt"),
        int("YearRemodAdd"),
        int("GrLivArea"),
        text("GarageType", true),
        text("BldgType", false),
        text("HouseStyle", false),
        int("MoSold"),
        int("YrSold"),
        int("SalePrice"),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.id)),
        Arc::new(StringArray::from(cols.neighborhood)),
        Arc::new(Float64Array::from(cols.lot_frontage)),
        Arc::new(Int64Array::from(cols.overall_qual)),
        Arc::new(Int64Array::from(cols.year_built)),
        Arc::new(Int64Array::from(cols.year_remod_add)),
        Arc::new(Int64Array::from(cols.gr_liv_area)),
        Arc::new(StringArray::from(cols.garage_type)),
        Arc::new(StringArray::from(cols.bldg_type)),
        Arc::new(StringArray::from(cols.house_style)),
        Arc::new(Int64Array::from(cols.mo_sold)),
        Arc::new(Int64Array::from(cols.yr_sold)),
        Arc::new(Int64Array::from(cols.sale_price)),
    ];

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// CSV in the Kaggle convention: missing values written as `NA`.
fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    let schema = batch.schema();
    writer
        .write_record(schema.fields().iter().map(|f| f.name().as_str()))
        .context("writing CSV header")?;

    for row in 0..batch.num_rows() {
        let record: Vec<String> = batch
            .columns()
            .iter()
            .map(|col| {
                if col.is_null(row) {
                    return Ok("NA".to_string());
                }
                arrow::util::display::array_value_to_string(col, row)
                    .context("formatting CSV cell")
            })
            .collect::<Result<_>>()?;
        writer.write_record(&record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.parquet".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let batch = to_batch(generate(&mut rng))?;

    log::debug!("first rows:\n{}", pretty_format_batches(&[batch.slice(0, 5)])?);

    if path.extension().and_then(|e| e.to_str()) == Some("csv") {
        write_csv(&batch, path)?;
    } else {
        write_parquet(&batch, path)?;
    }

    println!("Wrote {} sales to {}", batch.num_rows(), path.display());
    Ok(())
}
