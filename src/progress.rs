use crossterm::{
    cursor, execute,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const TICK: Duration = Duration::from_millis(80);

/// A stderr spinner animated on a background thread.
///
/// Stopping clears the line and restores the cursor. Dropping the spinner
/// stops it, so every early return leaves the terminal clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start spinning after `message`. Does nothing when stderr is not a terminal.
    pub fn start(message: &str) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        if !io::stderr().is_terminal() {
            return Self {
                running,
                handle: None,
            };
        }

        let flag = Arc::clone(&running);
        let message = message.to_string();
        let handle = thread::spawn(move || {
            let mut stderr = io::stderr();
            let _ = execute!(stderr, cursor::Hide);
            let mut frame = 0;
            while flag.load(Ordering::Relaxed) {
                let _ = execute!(
                    stderr,
                    cursor::MoveToColumn(0),
                    Print(format!("{message} {}", FRAMES[frame % FRAMES.len()]))
                );
                frame += 1;
                thread::sleep(TICK);
            }
            let _ = execute!(
                stderr,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                cursor::Show
            );
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
