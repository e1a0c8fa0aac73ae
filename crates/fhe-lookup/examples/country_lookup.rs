// Looks up the capital of a European country in an encrypted database.
//
// The database of (country, capital) pairs is encrypted once. The country
// entered by the user is encrypted and compared with every encrypted country
// name; only the capital of the matching country is ever decrypted.

mod util;

use std::{error::Error, io, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use console::style;
use fhe_lookup::{
    EncryptedDatabase, LookupParameters, LookupResult, QueryOrchestrator,
    backend::BfvSlotCipherBuilder,
    ops::lookup_depth,
    source::read_records_from_path,
    traits::SlotCipher,
};
use indicatif::ProgressBar;
use rand::rng;
use util::{DisplayDuration, timeit::timeit};

#[derive(Parser)]
struct Cli {
    #[arg(long, help = "The plaintext modulus", default_value = "257")]
    plaintext_modulus: u64,

    #[arg(long, help = "The number of slots of a ciphertext", default_value = "32")]
    slot_count: usize,

    #[arg(
        long,
        help = "The CSV file of (country, capital) pairs",
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/data/countries.csv")
    )]
    db_filename: PathBuf,

    #[arg(long, help = "The country to look up; read from stdin when absent")]
    country: Option<String>,

    #[arg(long, help = "Print the duration of each stage of the lookup")]
    debug: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Cli::parse();

    println!("# Country lookup with fhe-lookup");

    let cipher = timeit!(
        "Key generation",
        BfvSlotCipherBuilder::new()
            .set_plaintext_modulus(args.plaintext_modulus)
            .set_slot_count(args.slot_count)
            .build(&mut rng())
    );
    let cipher = match cipher {
        Ok(cipher) => Arc::new(cipher),
        Err(e) => {
            println!("{} {}", style("     error:").red().bold(), e);
            clap::Error::new(clap::error::ErrorKind::InvalidValue).exit();
        }
    };

    let params = LookupParameters::of(&*cipher);
    println!(
        "{} negligible, for this example only",
        style("  security:").magenta().bold()
    );
    println!("\tslot_count = {}", cipher.slot_count());
    println!("\tplaintext_modulus = {}", cipher.plaintext_modulus());
    println!("\tmoduli_sizes = {:?}", cipher.moduli_sizes());
    println!("\tmultiplicative_depth = {}", lookup_depth(&params));

    let records = read_records_from_path(&args.db_filename)?;
    println!(
        "Encrypting the database ({} entries)...",
        records.len()
    );
    let db = timeit!(
        "Database encryption",
        EncryptedDatabase::build(cipher.clone(), &records)?
    );
    println!("Initialization completed, ready for queries");

    let country = match args.country {
        Some(country) => country,
        None => {
            println!("Please enter the name of a country: ");
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    println!("Looking for the capital of {country}");
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("This may take a few minutes...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let report = QueryOrchestrator::new(&db).run(&country);
    spinner.finish_and_clear();
    let report = report?;

    if args.debug {
        for (stage, duration) in report.timings.stages() {
            println!("⏱  {stage:?}: {}", DisplayDuration(duration));
        }
        println!("⏱  Total: {}", DisplayDuration(report.timings.total()));
    }

    match &report.result {
        LookupResult::Found(capital) => {
            println!("{} {}", style("Query result:").green().bold(), capital)
        }
        LookupResult::NotFound => {
            println!("{} {}", style("Query result:").yellow().bold(), report.result);
            println!("*** Please make sure to enter the name of a European country");
            println!("*** with the first letter in upper case.");
        }
    }

    Ok(())
}
