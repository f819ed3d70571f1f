use clap::{Arg, Command};
use std::io::{self, Write};

const CATEGORIES: [&str; 4] = ["Доводчики", "Дверные глазки", "Цилиндровые механизмы", "Дверные петли"];
const BRANDS: [&str; 5] = ["NOTEDO", "APECS", "DORMA", "KALE", ""];

/// Writes a synthetic product_cards.csv to stdout, for load checks of the generator.
fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(
            Arg::new("quoted")
                .long("quoted")
                .help("Quote descriptions and embed commas, quotes and line breaks")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let rows: u64 = matches.get_one::<u64>("rows").copied().unwrap_or_default();
    let quoted = matches.get_flag("quoted");

    let mut out = io::BufWriter::new(io::stdout().lock());
    writeln!(
        &mut out,
        "id,slug,name,category,brand,stock,availability,image_url,seo_description"
    )?;

    // Deterministic data; every 7th row is out of stock, every 11th has no description.
    for i in 1..=rows {
        let category = CATEGORIES[(i % CATEGORIES.len() as u64) as usize];
        let brand = BRANDS[(i % BRANDS.len() as u64) as usize];
        let stock = if i % 7 == 0 { 0 } else { i % 50 + 1 };
        let availability = if stock > 0 { "in_stock" } else { "out_of_stock" };
        let description = match (i % 11 == 0, quoted) {
            (true, _) => String::new(),
            (false, true) => format!("\"Артикул {i:06}, \"\"серия\"\" A\nдля дверей\""),
            (false, false) => format!("Артикул {i:06} для дверей"),
        };

        writeln!(
            &mut out,
            "{i},item-{i},Товар {i:06},{category},{brand},{stock},{availability},https://cdn.example/{i}.jpg,{description}"
        )?;
        if i % 10_000 == 0 {
            out.flush()?;
        }
    }

    out.flush()?;
    Ok(())
}
