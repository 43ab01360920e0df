use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};

use clap::{Arg, Command};

use emotext::{EmojiText, Strategy};

fn read_input(input: &mut dyn Read, is_console: bool) -> Result<String, io::Error> {
    let mut buffer = Vec::new();

    if is_console {
        // Read chunks of data when input is from the console
        let mut chunk = [0; 1024];
        while let Ok(bytes_read) = input.read(&mut chunk) {
            if bytes_read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);
        }
    } else {
        input.read_to_end(&mut buffer)?;
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m";
    const RESET: &str = "\x1B[0m";

    let matches = Command::new("Emotext")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Read original text from <file>."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Write converted text to <file>."),
        )
        .arg(
            Arg::new("dict")
                .short('d')
                .long("dict")
                .value_name("file")
                .help("Dictionary artifact (.zstd compressed or legacy .bin).")
                .required(true),
        )
        .arg(
            Arg::new("strategy")
                .short('s')
                .long("strategy")
                .value_name("strategy")
                .default_value("kmp")
                .help("Span finding strategy: [kmp|heuristic]"),
        )
        .about(format!(
            "{BLUE}Emotext: Command line emoji to text converter{RESET}"
        ))
        .get_matches();

    let input_file = matches.get_one::<String>("input");
    let output_file = matches.get_one::<String>("output");
    let dict_file = matches.get_one::<String>("dict").unwrap();
    let strategy_name = matches.get_one::<String>("strategy").unwrap();

    let Some(strategy) = Strategy::from_str_option(strategy_name) else {
        eprintln!("Invalid strategy: {}", strategy_name);
        eprintln!("Valid strategies: [kmp|heuristic]");
        return Ok(());
    };

    let engine = if dict_file.ends_with(".bin") {
        EmojiText::from_binary_path(dict_file)?
    } else {
        EmojiText::from_compressed_path(dict_file)?
    };
    if let Some(warning) = emotext::get_last_error() {
        eprintln!("Warning: {}", warning);
    }

    // Determine input source
    let mut input: Box<dyn Read> = match input_file {
        Some(file_name) => Box::new(BufReader::new(File::open(file_name)?)),
        None => {
            if io::stdin().is_terminal() {
                println!("{BLUE}Input text to convert, <ctrl-z> or <ctrl-d> to submit:{RESET}");
            }
            Box::new(io::stdin())
        }
    };

    let is_console = input_file.is_none();
    let input_str = read_input(&mut *input, is_console)?;

    let conversion = engine.convert(&input_str, strategy)?;

    let mut output = BufWriter::new(match output_file {
        Some(file_name) => Box::new(File::create(file_name)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    });
    write!(output, "{}", conversion.text)?;
    output.flush()?;

    // Print conversion summary
    let source_label = input_file.map(String::as_str).unwrap_or("<stdin>");
    let target_label = output_file.map(String::as_str).unwrap_or("stdout");
    println!(
        "{BLUE}Conversion completed ({strategy_name}): {} -> {}{RESET}",
        source_label, target_label
    );
    if conversion.not_found > 0 {
        eprintln!(
            "{} emoji sequence(s) had no dictionary entry",
            conversion.not_found
        );
    }

    Ok(())
}
