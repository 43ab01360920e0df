use std::path::PathBuf;

use clap::{Arg, Command};

use emotext::dictionary_lib::binary_codec;
use emotext::utils::format_thousand;
use emotext::{ListingSource, TableSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m";
    const RESET: &str = "\x1B[0m";

    let matches = Command::new("Dict Generator")
        .arg(
            Arg::new("listing")
                .short('i')
                .long("listing")
                .value_name("file")
                .help("Read emoji listing from <file> (code points, tab, short name per line).")
                .required(true),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("format")
                .default_value("zstd")
                .help("Dictionary format: [zstd|bin]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Write dictionary to <file>."),
        )
        .about(format!(
            "{BLUE}Dict Generator: Emoji dictionary artifact builder{RESET}"
        ))
        .get_matches();

    let listing = matches.get_one::<String>("listing").unwrap();
    let format = matches.get_one::<String>("format").unwrap();
    let default_output = match format.as_str() {
        "bin" => "emotext_dictionary.bin",
        "zstd" => "emotext_dictionary.zstd",
        _ => {
            eprintln!("Invalid format: {}", format);
            eprintln!("Valid formats: [zstd|bin]");
            return Ok(());
        }
    };
    let output_file = matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or(default_output);

    let source = ListingSource {
        path: PathBuf::from(listing),
    };
    let table = source.extract()?;
    if let Some(warning) = emotext::get_last_error() {
        eprintln!("Warning: {}", warning);
    }

    match format.as_str() {
        "bin" => binary_codec::save(output_file, &table)?,
        _ => binary_codec::save_compressed(output_file, &table)?,
    }

    println!(
        "{BLUE}Dictionary generated ({format}): {} entries, max pattern {} bytes -> {}{RESET}",
        format_thousand(table.len()),
        table.max_len(),
        output_file
    );

    Ok(())
}
