use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use evloop_core::{EventResult, ExecutionMode};
use evloop_handlers::Task;
use evloop_runtime::{Execution, TickReport};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const PROMPT: Color = Color::Green;
    const EVENT: Color = Color::Yellow;
    const OUTPUT: Color = Color::Cyan;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// A top-level menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Submit(Task),
    /// Tick without submitting, to collect earlier async output.
    Collect,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "4" => Some(Self::Collect),
            "5" => Some(Self::Exit),
            other => Task::from_choice(other).map(Self::Submit),
        }
    }
}

/// Terminal I/O for the interactive session.
pub struct Terminal {
    input: Lines<BufReader<Stdin>>,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub fn print_banner(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("evloop"),
            ResetColor,
            Print(" - cooperative event loop\n"),
            SetForegroundColor(Colors::DIM),
            Print("Each choice advances the loop by one tick.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        Ok(())
    }

    /// Read one trimmed line. `None` on end of input.
    async fn read_line(&mut self) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        execute!(stdout, SetForegroundColor(Colors::PROMPT), Print(" > "), ResetColor)?;
        stdout.flush()?;
        Ok(self.input.next_line().await?.map(|line| line.trim().to_string()))
    }

    /// Ask for a menu choice until a valid one is given. End of input exits.
    pub async fn prompt_menu(&mut self) -> Result<MenuChoice> {
        loop {
            let mut menu = String::from("\nWhat kind of task would you like to submit to the Event Loop?\n");
            for (i, task) in Task::ALL.iter().enumerate() {
                menu.push_str(&format!(" {}. {}\n", i + 1, task));
            }
            menu.push_str(" 4. Print output of previously submitted Async task\n");
            menu.push_str(" 5. Exit!\n");
            let mut stdout = io::stdout();
            execute!(stdout, Print(menu))?;

            let Some(line) = self.read_line().await? else {
                return Ok(MenuChoice::Exit);
            };
            match MenuChoice::parse(&line) {
                Some(choice) => return Ok(choice),
                None => self.print_error("Invalid input. Please select a valid option (1-5).")?,
            }
        }
    }

    /// Ask how to execute the task. `None` on end of input.
    pub async fn prompt_mode(&mut self) -> Result<Option<ExecutionMode>> {
        loop {
            let mut stdout = io::stdout();
            execute!(
                stdout,
                Print("How would you like to execute this operation?\n"),
                Print(" 1. Synchronously (this would block the Event Loop until the operation completes)\n"),
                Print(" 2. Asynchronously (this won't block Event Loop in any way)\n"),
            )?;

            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            match ExecutionMode::from_choice(&line) {
                Some(mode) => return Ok(Some(mode)),
                None => self.print_error("Invalid input. Please select a valid option (1 or 2).")?,
            }
        }
    }

    /// Render what one tick did, in the order it happened.
    pub fn print_report(&self, report: &TickReport) -> Result<()> {
        let mut stdout = io::stdout();
        if let Some(dispatch) = &report.dispatched {
            execute!(
                stdout,
                SetForegroundColor(Colors::EVENT),
                Print(format!("\nReceived Event: {} ({})\n\n", dispatch.key, dispatch.mode)),
                ResetColor,
            )?;
            match &dispatch.execution {
                Execution::Skipped => {
                    execute!(stdout, Print(format!("No handler found for {}\n\n", dispatch.key)))?;
                }
                execution => {
                    if let Execution::Completed(result) = execution {
                        self.print_output(result)?;
                    }
                    execute!(
                        stdout,
                        SetForegroundColor(Colors::DIM),
                        Print(format!(
                            "Event loop was blocked for {} ms due to this operation\n\n",
                            dispatch.blocked_for.as_millis()
                        )),
                        ResetColor,
                    )?;
                }
            }
        }
        if let Some(result) = &report.drained {
            self.print_output(result)?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn print_output(&self, result: &EventResult) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::OUTPUT),
            Print(format!("{result}\n\n")),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{msg}\n")),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("{msg}\n")),
            ResetColor,
        )?;
        Ok(())
    }
}
