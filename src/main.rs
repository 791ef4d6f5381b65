use std::{
    collections::HashSet,
    env,
    fs,
    process,
};

use ankipeek::{
    core::{
        http::{
            fetch_apkg,
            http_client,
        },
        models::{
            ApkgTables,
            RevlogOptions,
        },
    },
    export::{
        notes_to_csv,
        reviews_to_csv,
    },
    load_apkg,
    load_reviews,
    load_reviews_from_apkg,
    revlog::reduce,
    ApkgOptions,
    AnkipeekError,
};

const USAGE: &str = "usage: ankipeek [--reviews] [--csv] [--limit N] [--oldest] <apkg-path-or-url>";

struct Args {
    source: String,
    reviews: bool,
    csv: bool,
    limit: Option<u32>,
    recent: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args =
        Args { source: String::new(), reviews: false, csv: false, limit: Some(100), recent: true };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--reviews" => args.reviews = true,
            "--csv" => args.csv = true,
            "--oldest" => args.recent = false,
            "--limit" => {
                let value = iter.next().ok_or("--limit needs a value")?;
                let n: u32 = value.parse().map_err(|_| format!("bad --limit value '{value}'"))?;
                args.limit = (n > 0).then_some(n);
            }
            other if args.source.is_empty() && !other.starts_with('-') => {
                args.source = other.to_string();
            }
            other => return Err(format!("unrecognized argument '{other}'")),
        }
    }

    if args.source.is_empty() {
        return Err("missing input path or URL".to_string());
    }
    Ok(args)
}

fn read_source(source: &str) -> Result<Vec<u8>, AnkipeekError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let client = http_client()?;
        fetch_apkg(&client, source, None)
    } else {
        Ok(fs::read(source)?)
    }
}

fn print_tables(loaded: &ApkgTables, csv: bool) {
    for table in &loaded.tables {
        if csv {
            print!("{}", notes_to_csv(table));
            continue;
        }

        println!("{} ({} notes)", table.name, table.notes.len());
        println!("  fields: {}", table.field_names.join(", "));
        if let Some(first) = table.notes.first() {
            for name in &table.field_names {
                let value = first.get(name).map_or("", String::as_str);
                println!("    {}: {}", name, value);
            }
        }
    }

    if let Some(media) = &loaded.media {
        println!("{} media files indexed", media.len());
    }
}

fn run(args: &Args) -> Result<(), AnkipeekError> {
    let bytes = read_source(&args.source)?;

    if args.reviews {
        let options = RevlogOptions { limit: args.limit, recent: args.recent };
        let (_context, events) = if args.source.ends_with(".anki2") {
            load_reviews(&bytes, &options)?
        } else {
            load_reviews_from_apkg(bytes, &options)?
        };

        if args.csv {
            print!("{}", reviews_to_csv(&events));
        } else {
            let summary = reduce(&events, &HashSet::new());
            println!("{} reviews over {} cards", events.len(), summary.order.len());
            for card_id in &summary.order {
                let history = &summary.histories[card_id];
                println!(
                    "  #{} card {}: {} reviews, pass rate {:.2}",
                    history.temporal_index,
                    card_id,
                    history.all_events.len(),
                    history.pass_rate()
                );
            }
        }
        return Ok(());
    }

    let loaded = load_apkg(bytes, &ApkgOptions { load_media: true, ..Default::default() })?;
    print_tables(&loaded, args.csv);
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("ankipeek: {e}");
        process::exit(1);
    }
}
