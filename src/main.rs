//! Binary entrypoint that serves the chat interface.
//! Run with: `GROQ_API_KEY=... cargo run`

use std::process::ExitCode;

use futee_chat::start_futee_chat;

fn main() -> ExitCode {
    start_futee_chat::run()
}
