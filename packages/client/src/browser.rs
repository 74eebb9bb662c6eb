//! Interactive walk through the errors of a validation run.

use std::io::{self, Write};

use crate::report::ErrorLog;

/// Source of user input lines. `None` means end of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

impl LineSource for rustyline::DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.readline(prompt).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Connect,
    Send,
    Receive,
    StopReason,
    Server,
}

impl Category {
    const ALL: [Category; 5] = [
        Category::Connect,
        Category::Send,
        Category::Receive,
        Category::StopReason,
        Category::Server,
    ];

    fn number(self) -> usize {
        match self {
            Category::Connect => 1,
            Category::Send => 2,
            Category::Receive => 3,
            Category::StopReason => 4,
            Category::Server => 5,
        }
    }

    fn menu_label(self) -> &'static str {
        match self {
            Category::Connect => "Connect errors",
            Category::Send => "Send errors",
            Category::Receive => "Receive errors",
            Category::StopReason => "Stopped receive reasons",
            Category::Server => "Server errors",
        }
    }

    fn entry_label(self) -> &'static str {
        match self {
            Category::Connect => "Connect error",
            Category::Send => "Send error",
            Category::Receive => "Receive error",
            Category::StopReason => "Stopped receive reason",
            Category::Server => "Server error",
        }
    }
}

pub struct ErrorBrowser<'a> {
    errors: &'a mut ErrorLog,
}

impl<'a> ErrorBrowser<'a> {
    pub fn new(errors: &'a mut ErrorLog) -> Self {
        Self { errors }
    }

    /// Ask whether to browse, then show one error per choice, oldest first,
    /// removing it from the log. Ends when the log is empty, on `0`, or at
    /// end of input.
    pub fn run(&mut self, input: &mut dyn LineSource, out: &mut dyn Write) -> io::Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }

        let Some(answer) = input.read_line("Go through errors? [Y/n] ") else {
            return Ok(());
        };
        if !matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes") {
            return Ok(());
        }

        loop {
            let available: Vec<Category> = Category::ALL
                .into_iter()
                .filter(|category| self.len(*category) > 0)
                .collect();
            if available.is_empty() {
                return Ok(());
            }

            writeln!(out)?;
            writeln!(out, "Choose error type to view:")?;
            for category in &available {
                writeln!(
                    out,
                    "{}) {} ({} left)",
                    category.number(),
                    category.menu_label(),
                    self.len(*category)
                )?;
            }
            writeln!(out, "0) Exit")?;
            out.flush()?;

            let chosen = loop {
                let Some(line) = input.read_line("> ") else {
                    return Ok(());
                };
                match line.trim().parse::<usize>() {
                    Ok(0) => return Ok(()),
                    Ok(n) => {
                        if let Some(category) = available.iter().find(|c| c.number() == n) {
                            break *category;
                        }
                    }
                    Err(_) => {}
                }
                writeln!(out, "Invalid choice")?;
            };

            if let Some(entry) = self.pop(chosen) {
                writeln!(out, "{}: {}", chosen.entry_label(), entry)?;
            }
        }
    }

    fn len(&self, category: Category) -> usize {
        match category {
            Category::Connect => self.errors.connect.len(),
            Category::Send => self.errors.send.len(),
            Category::Receive => self.errors.receive.len(),
            Category::StopReason => self.errors.stop_reasons.len(),
            Category::Server => self.errors.server.len(),
        }
    }

    fn pop(&mut self, category: Category) -> Option<String> {
        match category {
            Category::Connect => self.errors.connect.pop_front().map(|e| e.to_string()),
            Category::Send => self.errors.send.pop_front().map(|e| e.to_string()),
            Category::Receive => self.errors.receive.pop_front().map(|e| e.to_string()),
            Category::StopReason => self.errors.stop_reasons.pop_front().map(|e| e.to_string()),
            Category::Server => self.errors.server.pop_front().map(|e| e.to_string()),
        }
    }
}
