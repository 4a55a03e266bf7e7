//! comment-lottery - draw winners from the commenters of a post
//!
//! ## Quick Start
//!
//! ```bash
//! # Store the Cookie header of a logged-in browser session
//! comment-lottery auth set-cookie 'SESSDATA=...; bili_jct=...'
//!
//! # Draw two winners among fans who commented on a video
//! comment-lottery draw 123456 1 --relation fan -n 2
//!
//! # Look at past draws
//! comment-lottery history show latest
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
