use std::time::Duration;

use log::{debug, info};

use crate::entry::{Document, Stamp, WorkEntry};

/// Tag put on tasks started through an interrupt.
pub const INTERRUPT_TAG: &str = "interrupt";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("You are already working on {0}. Stop it or use a different sheet.")]
    AlreadyWorking(String),
    #[error("For all I know, you aren't working on anything. I don't know what to do.")]
    NotWorking,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State<'a> {
    Idle,
    /// `depth` is the number of suspended tasks waiting underneath.
    Working { current: &'a WorkEntry, depth: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stopped {
    pub stopped: WorkEntry,
    pub resumed: Option<Resumed>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resumed {
    pub name: String,
    /// Tasks still suspended after this one was popped.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interrupted {
    pub stopped: WorkEntry,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub name: String,
    pub total: Duration,
    pub working: bool,
}

impl Document {
    pub fn state(&self) -> State<'_> {
        match self.current() {
            Some(current) => State::Working {
                current,
                depth: self.interrupt_stack.len(),
            },
            None => State::Idle,
        }
    }

    pub fn start_work(&mut self, name: &str, time: Stamp) -> Result<(), Error> {
        if let Some(current) = self.current() {
            return Err(Error::AlreadyWorking(current.name.clone()));
        }

        info!("Starting {name} at {time}");
        self.work.push(WorkEntry::open(name, time));
        Ok(())
    }

    /// Closes the open entry and, if anything was interrupted, resumes the
    /// most recently suspended task as a fresh entry starting at `time`.
    pub fn stop_work(&mut self, time: Stamp) -> Result<Stopped, Error> {
        let stopped = self.close_current(time)?;

        let resumed = match self.interrupt_stack.pop() {
            Some(suspended) => {
                self.start_work(&suspended.name, time)?;
                Some(Resumed {
                    name: suspended.name,
                    depth: self.interrupt_stack.len(),
                })
            }
            None => None,
        };

        Ok(Stopped { stopped, resumed })
    }

    pub fn interrupt(&mut self, name: &str, time: Stamp) -> Result<Interrupted, Error> {
        let stopped = self.close_current(time)?;
        self.interrupt_stack.push(stopped.clone());

        self.start_work(name, time)?;
        self.add_tags([INTERRUPT_TAG.to_owned()])?;

        let depth = self.interrupt_stack.len();
        info!("Interrupted {} for {name}, {depth} deep", stopped.name);
        Ok(Interrupted { stopped, depth })
    }

    /// Returns the name of the entry that was tagged.
    pub fn add_tags(
        &mut self,
        tags: impl IntoIterator<Item = String>,
    ) -> Result<String, Error> {
        let current = self.current_mut().ok_or(Error::NotWorking)?;
        current.tags.extend(tags);
        Ok(current.name.clone())
    }

    /// Returns the name of the entry the note went to.
    pub fn add_note(&mut self, text: String) -> Result<String, Error> {
        let current = self.current_mut().ok_or(Error::NotWorking)?;
        current.notes.push(text);
        Ok(current.name.clone())
    }

    /// The open entry and how long it has been running at `now`.
    pub fn status(&self, now: Stamp) -> Result<(&WorkEntry, Duration), Error> {
        match self.state() {
            State::Idle => Err(Error::NotWorking),
            State::Working { current, depth } => {
                debug!("Status asked {depth} deep in interrupts");
                Ok((current, now.saturating_since(current.start)))
            }
        }
    }

    /// Time per task name, largest first; ties keep first-seen order.
    pub fn log(&self, now: Stamp) -> Vec<LogRow> {
        let mut rows: Vec<LogRow> = Vec::new();

        // Suspended tasks are snapshots of entries already in `work`.
        let suspended = self
            .interrupt_stack
            .iter()
            .filter(|entry| !self.work.contains(entry));

        for entry in self.work.iter().chain(suspended) {
            let elapsed = entry.elapsed(now);
            match rows.iter_mut().find(|row| row.name == entry.name) {
                Some(row) => row.total += elapsed,
                None => rows.push(LogRow {
                    name: entry.name.clone(),
                    total: elapsed,
                    working: false,
                }),
            }
        }

        if let Some(current) = self.current() {
            for row in rows.iter_mut().filter(|row| row.name == current.name) {
                row.working = true;
            }
        }

        rows.sort_by(|a, b| b.total.cmp(&a.total));
        rows
    }

    fn close_current(&mut self, time: Stamp) -> Result<WorkEntry, Error> {
        let current = self.current_mut().ok_or(Error::NotWorking)?;
        current.close(time);
        info!("Stopped {} after {:?} minutes", current.name, current.total_mins);
        Ok(current.clone())
    }
}
