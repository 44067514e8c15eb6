use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use codec::CompressedSource;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "srcbench", version, about = "srcz codec benchmark harness")]
struct Cli {
    /// Scenario to run.
    #[arg(long, value_enum, default_value_t = Scenario::JsLike)]
    scenario: Scenario,
    /// Source size in characters.
    #[arg(long, default_value_t = 64 * 1024)]
    chars: usize,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Number of random-access probes.
    #[arg(long, default_value_t = 10_000)]
    probes: usize,
    /// Output directory for summary.json.
    #[arg(long, default_value = "target/srcbench")]
    out_dir: PathBuf,
    /// Print the summary as JSON to stdout instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, PartialEq, Eq)]
enum Scenario {
    /// Keyword-heavy program source, the intended workload.
    JsLike,
    /// ASCII source interleaved with non-ASCII identifiers and strings.
    Mixed,
    /// Characters with no dictionary entry, the worst case.
    Incompressible,
}

#[derive(Serialize)]
struct Summary {
    scenario: Scenario,
    seed: u64,
    chars: usize,
    payload_bytes: usize,
    index_bytes: usize,
    bytes_per_char: f64,
    encode_ns_per_char: f64,
    decode_ns_per_char: f64,
    probe_ns_avg: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let text = generate(cli.scenario, cli.chars, cli.seed);
    let char_count = text.encode_utf16().count();

    let encode_start = Instant::now();
    let source = CompressedSource::from_str(&text);
    let encode_elapsed = encode_start.elapsed();

    let decode_start = Instant::now();
    let decoded = source.decompress();
    let decode_elapsed = decode_start.elapsed();
    assert_eq!(decoded.len(), char_count, "decode must reproduce the input");

    let mut rng = XorShift64::new(cli.seed ^ 0x9E37_79B9_7F4A_7C15);
    let probe_start = Instant::now();
    let mut checksum = 0u32;
    for _ in 0..cli.probes {
        let pos = rng.below(char_count.max(1));
        let cursor = source.cursor_at(pos);
        checksum = checksum.wrapping_add(u32::from(source.unit_at(cursor)));
    }
    let probe_elapsed = probe_start.elapsed();
    // Keep the probe loop observable.
    let _ = checksum;

    let summary = Summary {
        scenario: cli.scenario,
        seed: cli.seed,
        chars: char_count,
        payload_bytes: source.payload_len(),
        index_bytes: source.as_bytes().len() - source.payload_len(),
        bytes_per_char: source.payload_len() as f64 / char_count.max(1) as f64,
        encode_ns_per_char: encode_elapsed.as_nanos() as f64 / char_count.max(1) as f64,
        decode_ns_per_char: decode_elapsed.as_nanos() as f64 / char_count.max(1) as f64,
        probe_ns_avg: probe_elapsed.as_nanos() as f64 / cli.probes.max(1) as f64,
    };

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create {}", cli.out_dir.display()))?;
    let summary_path = cli.out_dir.join("summary.json");
    fs::write(
        &summary_path,
        serde_json::to_vec_pretty(&summary).context("serialize summary")?,
    )
    .with_context(|| format!("write {}", summary_path.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("scenario:        {:?}", summary.scenario);
        println!("chars:           {}", summary.chars);
        println!("payload bytes:   {}", summary.payload_bytes);
        println!("bytes/char:      {:.3}", summary.bytes_per_char);
        println!("encode ns/char:  {:.1}", summary.encode_ns_per_char);
        println!("decode ns/char:  {:.1}", summary.decode_ns_per_char);
        println!("probe ns (avg):  {:.1}", summary.probe_ns_avg);
        println!("summary:         {}", summary_path.display());
    }

    Ok(())
}

fn generate(scenario: Scenario, chars: usize, seed: u64) -> String {
    let mut rng = XorShift64::new(seed);
    let mut text = String::new();
    match scenario {
        Scenario::JsLike => {
            const SNIPPETS: &[&str] = &[
                "function ",
                "return ",
                "var ",
                "let ",
                "const ",
                "if (",
                ") {\n",
                "}\n",
                " = ",
                " === ",
                " !== ",
                "();\n",
                "this.",
                "prototype.",
                "length",
                "undefined",
            ];
            let mut units = 0usize;
            while units < chars {
                let snippet = SNIPPETS[rng.below(SNIPPETS.len())];
                text.push_str(snippet);
                units += snippet.len();
                if rng.below(3) == 0 {
                    let name = format!("name{}", rng.below(1000));
                    text.push_str(&name);
                    units += name.len();
                }
            }
        }
        Scenario::Mixed => {
            const FRAGMENTS: &[&str] = &[
                "let valeur = ",
                "\"caf\u{e9}\"",
                ";\n",
                "// \u{3053}\u{3093}\u{306b}\u{3061}\u{306f}\n",
                "const clef = lire(\u{1D11E});\n",
                "total += n;\n",
            ];
            let mut units = 0usize;
            while units < chars {
                let fragment = FRAGMENTS[rng.below(FRAGMENTS.len())];
                text.push_str(fragment);
                units += fragment.encode_utf16().count();
            }
        }
        Scenario::Incompressible => {
            // Characters deliberately outside the dictionary: every one
            // costs a two-byte ASCII escape.
            const RAW: &[u8] = b"%^@~#ABCDEFGHIJKLMNOPQRSTUVWXYZ";
            while text.len() < chars {
                text.push(char::from(RAW[rng.below(RAW.len())]));
            }
        }
    }
    truncate_to_units(text, chars)
}

/// Trims to exactly `chars` UTF-16 code units without splitting a
/// surrogate pair.
fn truncate_to_units(text: String, chars: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = 0usize;
    for c in text.chars() {
        let w = c.len_utf16();
        if units + w > chars {
            break;
        }
        out.push(c);
        units += w;
    }
    out
}

struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound.max(1) as u64) as usize
    }
}
