use std::env;
use std::path::PathBuf;

use docqa_cli::{build_service, describe, ephemeral_history_note, init_tracing, load_file, load_settings, load_topic, print_answer, print_history, print_loaded, print_status};

const USAGE: &str = "Usage: docqa <command> [args...]

Commands:
  ask <file> <question>      load a .pdf/.txt/.md file and answer one question
  wiki <topic> <question>    load a Wikipedia article and answer one question
  history [N]                show the N most recent questions (default 10)
  clear-history              forget all recorded questions
  status                     show what is loaded and how much history exists

Every run starts with no document loaded, so `status` reports only the
history count. History outlives a run only when `history.path` is set
(config.toml or APP_HISTORY__PATH). Use `docqa-chat` for a session.";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { eprintln!("{}", USAGE); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

fn two_args(args: &[String], usage: &str) -> (String, String) {
    match args {
        [first, rest @ ..] if !rest.is_empty() => (first.clone(), rest.join(" ")),
        _ => { eprintln!("Usage: {}", usage); std::process::exit(1) }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let (cmd, args) = parse_args();
    if matches!(cmd.as_str(), "-h" | "--help" | "help") {
        println!("{}", USAGE);
        return Ok(());
    }
    let settings = load_settings()?;
    let service = build_service(&settings)?;
    if matches!(cmd.as_str(), "history" | "clear-history" | "status") {
        if let Some(note) = ephemeral_history_note(&settings) { eprintln!("{}", note); }
    }

    let outcome = match cmd.as_str() {
        "ask" => {
            let (file, question) = two_args(&args, "docqa ask <file> <question>");
            async {
                let report = load_file(&service, &PathBuf::from(&file)).await?;
                print_loaded(&report);
                print_answer(&service.query(&question).await?);
                anyhow::Ok(())
            }
            .await
        }
        "wiki" => {
            let (topic, question) = two_args(&args, "docqa wiki <topic> <question>");
            async {
                let report = load_topic(&service, &topic).await?;
                print_loaded(&report);
                print_answer(&service.query(&question).await?);
                anyhow::Ok(())
            }
            .await
        }
        "history" => {
            let limit = match args.first() {
                Some(n) => n.parse::<usize>().unwrap_or_else(|_| { eprintln!("Error: history limit must be a number"); std::process::exit(1) }),
                None => 10,
            };
            service.history(limit).map(|entries| print_history(&entries)).map_err(anyhow::Error::from)
        }
        "clear-history" => service.clear_history().map(|_| println!("🧹 History cleared")).map_err(anyhow::Error::from),
        "status" => {
            print_status(&service.status());
            Ok(())
        }
        _ => { eprintln!("Unknown command: {}\n\n{}", cmd, USAGE); std::process::exit(1); }
    };

    if let Err(e) = outcome {
        eprintln!("❌ {}", describe(&e));
        std::process::exit(2);
    }
    Ok(())
}
