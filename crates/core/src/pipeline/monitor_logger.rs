use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for monitor loop events.
///
/// Decouples the loop from specific output mechanisms (stdout, GUI
/// signals, log crate) so each caller can observe monitoring behavior
/// without changing the orchestration code.
pub trait MonitorLogger: Send {
    /// Report cycle-level progress. `total` is 0 for live sources.
    fn cycle(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Report that the active alert set changed.
    fn alerts(&mut self, messages: &[String]);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
///
/// Used by the desktop GUI (which has its own channel-based updates)
/// and by tests where logger output is irrelevant.
pub struct NullMonitorLogger;

impl MonitorLogger for NullMonitorLogger {
    fn cycle(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn alerts(&mut self, _messages: &[String]) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks per-stage timing and provides a
/// summary report when monitoring ends.
///
/// Cycle output is throttled to every `throttle_cycles` cycles to avoid
/// excessive I/O on long sessions. Alert transitions are never
/// throttled; each one is logged as it happens.
pub struct StdoutMonitorLogger {
    throttle_cycles: usize,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    cycles_seen: usize,
    messages: Vec<String>,
}

impl StdoutMonitorLogger {
    pub fn new(throttle_cycles: usize) -> Self {
        Self {
            throttle_cycles: throttle_cycles.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            cycles_seen: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let cycles = self.cycles_seen;
        let mut lines = Vec::new();

        lines.push(format!(
            "Monitoring summary ({cycles} cycles, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        if cycles > 0 && elapsed_ms > 0.0 {
            let fps = cycles as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} cycles/s"));
        }

        Some(lines.join("\n"))
    }

    /// Returns the timing data for a given stage.
    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StdoutMonitorLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl MonitorLogger for StdoutMonitorLogger {
    fn cycle(&mut self, current: usize, total: usize) {
        self.cycles_seen = self.cycles_seen.max(current);
        if current % self.throttle_cycles == 0 || (total > 0 && current == total) {
            if total > 0 {
                let pct = current as f64 / total as f64 * 100.0;
                log::info!("Monitoring: {current}/{total} frames ({pct:.1}%)");
            } else {
                log::info!("Monitoring: {current} frames");
            }
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn alerts(&mut self, messages: &[String]) {
        log::warn!("Alerts: {}", messages.join(" | "));
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
