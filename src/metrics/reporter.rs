use std::fmt;

use crate::RunSummary;

use super::AggregateReport;

/// Formats run results for the terminal.
pub struct SummaryPrinter;

impl SummaryPrinter {
    pub fn print(summary: &RunSummary) {
        Self::print_class("Reads", &summary.reads);
        Self::print_class("Writes", &summary.writes);
    }

    pub fn print_class(label: &str, report: &AggregateReport) {
        println!("\n═══════════════════════════════════════════");
        println!("  {} ({} ok / {} tries)", label, report.successes, report.tries);
        println!("═══════════════════════════════════════════");
        println!("  Failed:       {} ({:.2}%)", report.failures(), report.failure_rate() * 100.0);

        match &report.latency {
            Some(stats) => {
                println!("  Latency:");
                println!("    min:    {:?}", stats.min);
                println!("    max:    {:?}", stats.max);
                println!("    mean:   {:?}", stats.mean);
                println!("    median: {:?}", stats.median);
                println!("    p25:    {:?}", stats.p25);
                println!("    p75:    {:?}", stats.p75);
                println!("    p95:    {:?}", stats.p95);
                println!("    p99:    {:?}", stats.p99);
            }
            None => println!("  Latency:      no samples recorded"),
        }
    }
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.latency {
            Some(stats) => write!(
                f,
                "{} ok / {} tries, median {:?}, p99 {:?}",
                self.successes, self.tries, stats.median, stats.p99
            ),
            None => write!(f, "{} ok / {} tries, no samples", self.successes, self.tries),
        }
    }
}
