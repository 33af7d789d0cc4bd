use std::io::Write;
use std::sync::Arc;

use chatflow_rs::catalog;
use chatflow_rs::client::ChatClient;
use chatflow_rs::config::{load_config, AppConfig};
use chatflow_rs::observability::init_tracing;
use chatflow_rs::store::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};

fn main() {
    let config = load_config("config.yaml").unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Please copy 'config.example.yaml' to 'config.yaml' and modify as needed.");
        std::process::exit(1);
    });

    init_tracing(&config.features.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize Tokio runtime: {e}");
            std::process::exit(1);
        });

    runtime.block_on(run(config));
}

async fn run(config: AppConfig) {
    let client = Arc::new(ChatClient::new(&config));
    let store = Arc::clone(client.store());

    println!(
        "chatflow — model: {} (Ctrl-D to exit)",
        catalog::display_name(client.selected_model())
    );

    let mut input_lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let line = match input_lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::error!(error = %err, "failed to read input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let base_len = store.len();
        let mut revisions = store.subscribe();
        let send_client = Arc::clone(&client);
        let exchange = tokio::spawn(async move { send_client.send_message(&line).await });

        // Follow the store and print whatever the streaming reply grew by.
        let mut printed = 0usize;
        loop {
            if revisions.changed().await.is_err() {
                break;
            }
            let snapshot = store.snapshot();
            let Some(reply) = snapshot
                .iter()
                .skip(base_len)
                .rev()
                .find(|m| m.sender == Sender::Ai)
            else {
                continue;
            };
            if reply.content.len() < printed {
                // Content was replaced wholesale (error path); reprint it.
                print!("\n{}", reply.content);
                printed = reply.content.len();
            } else if reply.content.len() > printed {
                print!("{}", &reply.content[printed..]);
                printed = reply.content.len();
            }
            let _ = std::io::stdout().flush();
            if !reply.is_streaming {
                match reply.model.as_deref() {
                    Some(model) => println!("\n[{}]", catalog::display_name(model)),
                    None => println!(),
                }
                break;
            }
        }

        if let Err(err) = exchange.await {
            tracing::error!(error = %err, "exchange task failed");
        }
    }
}
