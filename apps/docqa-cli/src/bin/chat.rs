use std::env;
use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use docqa_cli::{build_service, describe, init_tracing, load_file, load_settings, load_topic, print_answer, print_history, print_loaded, print_status};
use docqa_engine::QueryService;

const HELP: &str = "Type a question, or one of:
  :load <file>     load a .pdf/.txt/.md document
  :wiki <topic>    load a Wikipedia article
  :status          show what is loaded
  :history [N]     show recent questions
  :clear           unload the document
  :forget          clear the question history
  :quit            exit";

enum Flow {
    Continue,
    Quit,
}

async fn handle(service: &QueryService, line: &str) -> anyhow::Result<Flow> {
    let (cmd, rest) = line.split_once(' ').map(|(c, r)| (c, r.trim())).unwrap_or((line, ""));
    match cmd {
        ":quit" | ":q" | ":exit" => return Ok(Flow::Quit),
        ":help" | ":h" => println!("{}", HELP),
        ":load" if !rest.is_empty() => print_loaded(&load_file(service, &PathBuf::from(rest)).await?),
        ":wiki" if !rest.is_empty() => print_loaded(&load_topic(service, rest).await?),
        ":status" => print_status(&service.status()),
        ":history" => print_history(&service.history(rest.parse().unwrap_or(10))?),
        ":clear" => {
            service.clear_corpus().await;
            println!("🧹 Document unloaded");
        }
        ":forget" => {
            service.clear_history()?;
            println!("🧹 History cleared");
        }
        _ if cmd.starts_with(':') => println!("Unknown or incomplete command: {}\n{}", line, HELP),
        _ if !service.is_ready() => println!("📭 Load a document first (:load <file> or :wiki <topic>)"),
        _ => print_answer(&service.query(line).await?),
    }
    Ok(Flow::Continue)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let service = build_service(&load_settings()?)?;
    println!("💬 docqa chat\n============");

    let args: Vec<String> = env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        let loaded = match args[i].as_str() {
            "--wiki" | "-w" => {
                let Some(topic) = args.get(i + 1) else { eprintln!("Error: --wiki requires a topic"); std::process::exit(1) };
                i += 1;
                load_topic(&service, topic).await
            }
            path => load_file(&service, &PathBuf::from(path)).await,
        };
        match loaded {
            Ok(report) => print_loaded(&report),
            Err(e) => eprintln!("❌ {}", describe(&e)),
        }
        i += 1;
    }
    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim();
        if line.is_empty() { continue; }
        match handle(&service, line).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => eprintln!("❌ {}", describe(&e)),
        }
    }
    Ok(())
}
