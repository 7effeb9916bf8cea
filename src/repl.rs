//! Interactive read-evaluate-print surface.
//!
//! Reserved control tokens: `quit` / `exit` / `bye` terminate, `reset` clears
//! the session. Everything else is passed verbatim to
//! [`ChatSession::chat`](crate::session::ChatSession::chat). EOF ends the
//! loop cleanly; nothing persists on exit.

use crossterm::{
    ExecutableCommand,
    style::{Attribute, Color, SetAttribute, SetForegroundColor},
};
use std::{
    error::Error,
    io::{BufRead, Write, stdin, stdout},
};

use crate::{client::ChatCompleter, encoder::Encoder, session::ChatSession};

const BANNER: &str = "\
============================================================
MOOD-BASED RESTAURANT MENU CHAT
============================================================
Ask me anything about the menu! I'll pick up on your mood
and recommend food accordingly.

Commands:
  - 'quit', 'exit' or 'bye': leave the chat
  - 'reset': clear conversation history and mood
============================================================";

/// Run the interactive loop until the user quits or stdin closes.
pub async fn interactive_mode<C: ChatCompleter, E: Encoder>(
    session: &mut ChatSession<C, E>,
) -> Result<(), Box<dyn Error>> {
    println!("{BANNER}\n");

    let mut out = stdout();
    loop {
        out.execute(SetForegroundColor(Color::Green))?;
        print!("You: ");
        out.flush()?;
        out.execute(SetForegroundColor(Color::Reset))?;

        let mut input = String::new();
        if stdin().lock().read_line(&mut input)? == 0 {
            // EOF
            println!();
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "bye" => {
                println!("\nThanks for chatting! Have a great day!");
                break;
            }
            "reset" => {
                session.reset();
                println!("Conversation history and mood cleared.\n");
                continue;
            }
            _ => {}
        }

        let mood_before = session.mood();
        let reply = session.chat(input).await;

        if session.mood() != mood_before {
            if let Some(mood) = session.mood() {
                out.execute(SetAttribute(Attribute::Dim))?;
                println!("[mood: {mood}]");
                out.execute(SetAttribute(Attribute::Reset))?;
            }
        }

        out.execute(SetForegroundColor(Color::Blue))?;
        out.execute(SetAttribute(Attribute::Bold))?;
        println!("\nAssistant: {reply}\n");
        out.execute(SetAttribute(Attribute::Reset))?;
        out.execute(SetForegroundColor(Color::Reset))?;
    }

    Ok(())
}
