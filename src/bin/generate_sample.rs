use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic CORD-19 style metadata.csv.
#[derive(Debug, Parser)]
#[command(name = "generate_sample", about)]
struct Args {
    /// Number of rows to write
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// Output file
    #[arg(long, default_value = "metadata.csv")]
    output: PathBuf,

    /// Seed for the generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Subset of the CORD-19 metadata columns, in source order.
#[derive(Debug, Serialize)]
struct Row {
    cord_uid: String,
    source_x: &'static str,
    title: String,
    doi: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    publish_time: String,
    authors: String,
    journal: String,
}

const SOURCES: &[&str] = &["PMC", "Medline", "WHO", "Elsevier", "medrxiv", "biorxiv"];

const JOURNALS: &[&str] = &[
    "PLoS One",
    "BMJ",
    "Lancet",
    "Sci Rep",
    "Nature",
    "Journal of Virology",
    "Int J Environ Res Public Health",
    "Viruses",
    "Emerg Infect Dis",
    "Cureus",
    "Front Immunol",
    "J Med Virol",
    "Vaccine",
    "Clinical Infectious Diseases",
];

const SURNAMES: &[&str] = &[
    "Zhang", "Smith", "Garcia", "Müller", "Rossi", "Kim", "Okafor", "Silva", "Nguyen", "Patel",
    "Ivanova", "Cohen",
];

const SUBJECTS: &[&str] = &[
    "SARS-CoV-2",
    "COVID-19",
    "Coronavirus",
    "Influenza",
    "MERS-CoV",
    "Respiratory syncytial virus",
];

const TOPICS: &[&str] = &[
    "transmission dynamics",
    "vaccine efficacy",
    "mental health outcomes",
    "hospital admissions",
    "viral shedding",
    "antibody response",
    "mortality risk factors",
    "social distancing",
    "genome sequencing",
    "ICU capacity",
];

const SETTINGS: &[&str] = &[
    "in healthcare workers",
    "among children",
    "in Wuhan",
    "in nursing homes",
    "during lockdown",
    "in patients with diabetes",
    "across Europe",
    "",
];

/// Publication years and their relative weights; the corpus is heavily
/// skewed towards 2020 and 2021.
const YEARS: &[(i32, u64)] = &[
    (2003, 2),
    (2008, 2),
    (2012, 3),
    (2015, 4),
    (2017, 4),
    (2019, 8),
    (2020, 45),
    (2021, 30),
    (2022, 6),
];

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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// True with probability `percent` / 100.
    fn chance(&mut self, percent: u64) -> bool {
        self.below(100) < percent
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

fn weighted_year(rng: &mut SimpleRng) -> i32 {
    let total: u64 = YEARS.iter().map(|&(_, w)| w).sum();
    let mut roll = rng.below(total);
    for &(year, weight) in YEARS {
        if roll < weight {
            return year;
        }
        roll -= weight;
    }
    YEARS[YEARS.len() - 1].0
}

fn publish_time(rng: &mut SimpleRng) -> String {
    let year = weighted_year(rng);
    let month = rng.below(12) + 1;
    let day = rng.below(28) + 1;
    match rng.below(100) {
        // missing
        0..=2 => String::new(),
        // malformed
        3..=4 => rng.pick(&["unknown", "2020-13-45", "Spring 2020", "NaN"][..]).to_string(),
        // year only, as older PMC entries are
        5..=14 => year.to_string(),
        _ => format!("{year}-{month:02}-{day:02}"),
    }
}

fn title(rng: &mut SimpleRng) -> String {
    let subject = rng.pick(SUBJECTS);
    let topic = rng.pick(TOPICS);
    let setting = rng.pick(SETTINGS);
    let title = match rng.below(3) {
        0 => format!("{subject} {topic} {setting}"),
        1 => format!("A study of {topic} {setting}: {subject} case report"),
        _ => format!("{topic} and {subject}: new clinical data {setting}"),
    };
    let title = title.trim().to_string();
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn authors(rng: &mut SimpleRng) -> String {
    let n = rng.below(4) + 1;
    (0..n)
        .map(|_| {
            let initial = (b'A' + rng.below(26) as u8) as char;
            format!("{}, {initial}.", rng.pick(SURNAMES))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn row(rng: &mut SimpleRng, id: usize) -> Row {
    let title = title(rng);
    let abstract_text = format!(
        "Background: {title}. Methods: we analysed {} records. Results: findings are reported.",
        rng.below(5000) + 20
    );
    Row {
        cord_uid: format!("{:08x}", rng.next_u64() as u32),
        source_x: *rng.pick(SOURCES),
        title: if rng.chance(3) { String::new() } else { title },
        doi: format!("10.{}/sample.{id}", 1000 + rng.below(9000)),
        abstract_text: if rng.chance(20) {
            String::new()
        } else {
            abstract_text
        },
        publish_time: publish_time(rng),
        authors: if rng.chance(2) {
            String::new()
        } else {
            authors(rng)
        },
        journal: if rng.chance(8) {
            String::new()
        } else {
            rng.pick(JOURNALS).to_string()
        },
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    for id in 0..args.rows {
        writer
            .serialize(row(&mut rng, id))
            .context("Failed to write row")?;
    }
    writer.flush().context("Failed to flush output")?;

    println!("Wrote {} rows to {}", args.rows, args.output.display());
    Ok(())
}
