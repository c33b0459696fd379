//! Client execution logic.
//!
//! Owns the pieces that outlive any single connection: the readline thread,
//! the [`ChatClient`], and the prompt loop that runs while disconnected.
//! A dropped connection lands back here; connecting again is always an
//! explicit `/connect`.

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use idobata_shared::time::SystemClock;

use crate::{
    directory,
    formatter::MessageFormatter,
    lifecycle::ChatClient,
    session::{LineAction, SessionEnd, handle_line, run_session},
};

/// Launch configuration for the interactive client.
pub struct ClientOptions {
    pub url: String,
    pub name: String,
    pub avatar: String,
    /// `None` disables the startup directory fetch
    pub directory_url: Option<String>,
}

/// Run the interactive chat client until the user quits.
pub async fn run_client(options: ClientOptions) -> Result<(), Box<dyn std::error::Error>> {
    // Decorative sidebar content; failure is non-fatal
    if let Some(directory_url) = &options.directory_url {
        match directory::fetch_directory(directory_url).await {
            Ok(profiles) => print!("{}", MessageFormatter::format_directory(&profiles)),
            Err(e) => tracing::warn!("Profile directory unavailable: {}", e),
        }
    }

    let mut client = ChatClient::new(options.name.as_str(), options.avatar.as_str());
    let clock = SystemClock;
    let prompt = build_prompt(&options.name);

    // rustyline runs on its own blocking thread feeding this channel
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    spawn_input_thread(input_tx, prompt.clone());

    println!("*** Type /help for commands");

    let mut want_connect = true; // connect on startup
    loop {
        if want_connect {
            want_connect = false;
            match client.connect() {
                Ok(true) => {
                    let ended =
                        run_session(&mut client, &options.url, &mut input_rx, &clock, &prompt)
                            .await;
                    match ended {
                        Ok(SessionEnd::Quit) => break,
                        Ok(SessionEnd::Disconnected) => println!("*** Disconnected"),
                        Err(e) => {
                            tracing::warn!("Connection lost: {}", e);
                            println!("*** {} (use /connect to try again)", e);
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => println!("*** {} (use /name <name>, then /connect)", e),
            }
        }

        // Prompt loop while disconnected
        let Some(line) = input_rx.recv().await else {
            break; // input thread ended (Ctrl+C / Ctrl+D)
        };
        match handle_line(&mut client, &clock, &line) {
            LineAction::None => {}
            LineAction::Connect => want_connect = true,
            LineAction::Disconnect => println!("*** Not connected"),
            LineAction::Quit => break,
        }
    }

    tracing::info!("Client exiting");
    Ok(())
}

/// Prompt string shown by the readline thread, fixed at launch.
fn build_prompt(name: &str) -> String {
    if name.is_empty() {
        "> ".to_string()
    } else {
        format!("{}> ", name)
    }
}

/// Spawn the blocking readline thread.
///
/// Lines are trimmed and empty ones dropped before they reach the channel.
/// The thread ends on Ctrl+C, Ctrl+D, or when the receiving side goes away;
/// the closed channel is the quit signal for the async side.
fn spawn_input_thread(input_tx: mpsc::UnboundedSender<String>, prompt: String) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_includes_launch_name() {
        // テスト項目: プロンプトに起動時の名前が含まれる
        // given (前提条件):
        let name = "Ada";

        // when (操作):
        let prompt = build_prompt(name);

        // then (期待する結果):
        assert_eq!(prompt, "Ada> ");
    }

    #[test]
    fn test_build_prompt_without_name() {
        // テスト項目: 名前が空の場合は素のプロンプトになる
        // given (前提条件):
        let name = "";

        // when (操作):
        let prompt = build_prompt(name);

        // then (期待する結果):
        assert_eq!(prompt, "> ");
    }
}
