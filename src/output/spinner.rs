use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use colored::Colorize;

/// Shows `<label> ●` on stdout with a blinking dot while a device is
/// being dialed.
///
/// Runs on its own thread so the blink keeps going through a slow TCP
/// connect. Stopping erases the dot and the label with backspaces and
/// leaves the line as it was.
pub struct Spinner {
    running: Arc<AtomicBool>,
    visible: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    label_width: usize,
}

impl Spinner {
    pub fn start(label: &str) -> Self {
        let label_width = if label.is_empty() {
            0
        } else {
            print!("{} ", label.bright_black());
            io::stdout().flush().ok();
            label.len() + 1
        };

        let running = Arc::new(AtomicBool::new(true));
        let visible = Arc::new(AtomicBool::new(false));

        let thread_running = running.clone();
        let thread_visible = visible.clone();
        let handle = thread::spawn(move || {
            let mut stdout = io::stdout();

            while thread_running.load(Ordering::Relaxed) {
                let shown = !thread_visible.load(Ordering::Relaxed);
                if shown {
                    print!("●");
                } else {
                    print!("\x08 \x08");
                }
                stdout.flush().ok();
                thread_visible.store(shown, Ordering::Relaxed);

                // Half a blink period, in small steps so stop() is quick
                for _ in 0..50 {
                    if !thread_running.load(Ordering::Relaxed) {
                        return;
                    }
                    thread::sleep(Duration::from_millis(10));
                }
            }
        });

        Self {
            running,
            visible,
            handle: Some(handle),
            label_width,
        }
    }

    /// Stop blinking and erase whatever is on screen, dot and label
    /// both. Safe to call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
        if self.visible.swap(false, Ordering::Relaxed) {
            print!("\x08 \x08");
        }
        for _ in 0..self.label_width {
            print!("\x08 \x08");
        }
        self.label_width = 0;
        io::stdout().flush().ok();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
