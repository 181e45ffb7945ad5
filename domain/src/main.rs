use std::env;
use std::process;

use domain::adapters::memory_store::InMemoryStore;
use domain::service::ShortenerService;
use domain::CoreError;

fn print_usage() {
    eprintln!(
        "{}\n\nUsage:\n  domain shorten <url>\n  domain resolve <code>\n\nNotes:\n  - This demo CLI uses an in-memory store; data is not persisted across runs.\n  - The same URL always shortens to the same 10-character code.",
        domain::about()
    );
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1); // skip program name

    let Some(cmd) = args.next() else {
        print_usage();
        return Ok(());
    };

    // Construct a demo service with in-memory storage
    let svc = ShortenerService::new(InMemoryStore::new());

    match cmd.as_str() {
        "shorten" => {
            let Some(url) = args.next() else {
                return Err("missing <url> for shorten".into());
            };
            match svc.shorten(&url) {
                Ok(code) => {
                    println!("shortened: {} -> {}", url, code.as_str());
                    Ok(())
                }
                Err(CoreError::InvalidUrl(_)) => Err("invalid url".into()),
                Err(e) => Err(format!("shorten failed: {}", e)),
            }
        }
        "resolve" => {
            let Some(code) = args.next() else {
                return Err("missing <code> for resolve".into());
            };
            match svc.resolve(&code) {
                Ok(url) => {
                    println!("{}", url);
                    Ok(())
                }
                Err(CoreError::InvalidCode(_)) => Err("invalid code".into()),
                Err(CoreError::NotFound) => Err("not found".into()),
                Err(e) => Err(format!("resolve failed: {}", e)),
            }
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn main() {
    if let Err(msg) = run() {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}
