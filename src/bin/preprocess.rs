//! Command-line converter from the city's venue CSV to the app's GeoJSON.
//!
//! Usage: `preprocess [input.csv] [output.geojson]`

use sports_venue_map::preprocess::{convert_csv, Conversion, PreprocessError};
use std::process::ExitCode;

const DEFAULT_INPUT: &str = "sports_20251201.csv";
const DEFAULT_OUTPUT: &str = "sports_data.geojson";
const TOP_DISTRICTS: usize = 5;

fn run(input: &str, output: &str) -> Result<Conversion, PreprocessError> {
    let content = std::fs::read_to_string(input)?;
    let conversion = convert_csv(&content)?;
    std::fs::write(output, conversion.to_geojson_string()?)?;
    Ok(conversion)
}

fn print_summary(conversion: &Conversion, output: &str) {
    println!(
        "Wrote {} venues to {}",
        conversion.collection.features.len(),
        output
    );
    if conversion.skipped_rows > 0 {
        println!("Skipped {} rows without coordinates", conversion.skipped_rows);
    }

    println!("\nVenue types:");
    for (category, count) in &conversion.category_counts {
        println!("  {}: {}", category, count);
    }

    println!("\nTop {} districts:", TOP_DISTRICTS);
    for (district, count) in conversion.district_counts.iter().take(TOP_DISTRICTS) {
        println!("  {}: {}", district, count);
    }

    if !conversion.repaired.is_empty() {
        println!("\nRepaired {} longitudes:", conversion.repaired.len());
        for fix in &conversion.repaired {
            println!("  {}: {} -> {}", fix.name, fix.original, fix.fixed);
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = args.first().map(String::as_str).unwrap_or(DEFAULT_INPUT);
    let output = args.get(1).map(String::as_str).unwrap_or(DEFAULT_OUTPUT);

    match run(input, output) {
        Ok(conversion) => {
            print_summary(&conversion, output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error converting {}: {}", input, e);
            ExitCode::FAILURE
        }
    }
}
