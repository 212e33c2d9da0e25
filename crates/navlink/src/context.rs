//! Build context for link generation: leveled logs, phase timers and progress
//!
//! Messages recorded here are also forwarded to the `log` facade, so callers
//! can either inspect the context after a run or just install a logger.

use std::collections::HashMap;
use std::time::Duration;
use web_time::Instant;

/// Log level for context messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl LogLevel {
    fn as_log_level(self) -> log::Level {
        match self {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Pipeline phases that are timed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerCategory {
    /// Whole generation run
    Total,
    /// Boundary edge extraction and clustering
    Extraction,
    /// All-pairs edge connection search
    ConnectionSearch,
    /// Per-edge drop-down search
    DropDownSearch,
}

/// Progress of the long-running connection search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    pub current: usize,
    pub total: usize,
    pub description: String,
}

impl ProgressInfo {
    /// Completed fraction in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            (self.current as f32 / self.total as f32).min(1.0)
        }
    }
}

/// Log entry containing message and metadata
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: Instant,
    pub message: String,
}

/// Accumulated time spent in one phase
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerEntry {
    pub total: Duration,
    pub count: usize,
}

/// Context passed through a generation run
#[derive(Debug)]
pub struct GenerationContext {
    logs: Vec<LogEntry>,
    active_timers: HashMap<TimerCategory, Instant>,
    timers: HashMap<TimerCategory, TimerEntry>,
    progress: Option<ProgressInfo>,
    min_log_level: LogLevel,
    max_log_entries: usize,
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationContext {
    pub fn new() -> Self {
        Self {
            logs: Vec::new(),
            active_timers: HashMap::new(),
            timers: HashMap::new(),
            progress: None,
            min_log_level: LogLevel::Info,
            max_log_entries: 1000,
        }
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.min_log_level = level;
    }

    pub fn set_max_log_entries(&mut self, max_entries: usize) {
        self.max_log_entries = max_entries;
    }

    pub fn log_debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: "navlink", level.as_log_level(), "{}", message);

        if level < self.min_log_level {
            return;
        }
        self.logs.push(LogEntry {
            level,
            timestamp: Instant::now(),
            message,
        });
        if self.logs.len() > self.max_log_entries {
            let excess = self.logs.len() - self.max_log_entries;
            self.logs.drain(..excess);
        }
    }

    pub fn start_timer(&mut self, category: TimerCategory) {
        self.active_timers.insert(category, Instant::now());
    }

    /// Stops a running timer and adds its elapsed time to the phase total
    pub fn stop_timer(&mut self, category: TimerCategory) {
        if let Some(start) = self.active_timers.remove(&category) {
            let entry = self.timers.entry(category).or_default();
            entry.total += start.elapsed();
            entry.count += 1;
        }
    }

    /// Runs `f` inside a timer for `category`
    pub fn timed<T>(&mut self, category: TimerCategory, f: impl FnOnce(&mut Self) -> T) -> T {
        self.start_timer(category);
        let out = f(self);
        self.stop_timer(category);
        out
    }

    pub fn timer_duration(&self, category: TimerCategory) -> Option<Duration> {
        self.timers.get(&category).map(|e| e.total)
    }

    pub fn timer_count(&self, category: TimerCategory) -> usize {
        self.timers.get(&category).map_or(0, |e| e.count)
    }

    pub fn set_progress(&mut self, current: usize, total: usize, description: impl Into<String>) {
        self.progress = Some(ProgressInfo {
            current,
            total,
            description: description.into(),
        });
    }

    pub fn clear_progress(&mut self) {
        self.progress = None;
    }

    pub fn progress(&self) -> Option<&ProgressInfo> {
        self.progress.as_ref()
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn logs_by_level(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter().filter(move |e| e.level == level)
    }

    /// Clears logs, timers and progress
    pub fn reset(&mut self) {
        self.logs.clear();
        self.active_timers.clear();
        self.timers.clear();
        self.progress = None;
    }

    /// Human-readable per-phase timing summary, slowest first
    pub fn timer_summary(&self) -> String {
        let mut sorted: Vec<_> = self.timers.iter().collect();
        sorted.sort_by(|a, b| b.1.total.cmp(&a.1.total));

        let mut out = String::new();
        for (category, entry) in sorted {
            out.push_str(&format!(
                "{:18} {:8.2}ms ({} runs)\n",
                format!("{:?}", category),
                entry.total.as_secs_f64() * 1000.0,
                entry.count
            ));
        }
        out
    }
}
