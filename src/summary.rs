use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::types::{CheckResult, ContentType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeTally {
    pub total: usize,
    pub working: usize,
    pub broken: usize,
}

impl TypeTally {
    fn add(&mut self, result: &CheckResult) {
        self.total += 1;
        if result.is_working() { self.working += 1 } else { self.broken += 1 }
    }

    /// Percentage of working items, 0 for an empty tally.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.working as f64 * 100.0 / self.total as f64 }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub working: usize,
    pub broken: usize,
    pub by_type: BTreeMap<ContentType, TypeTally>,
    pub generated_at: DateTime<Local>,
}

impl Summary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut all = TypeTally::default();
        let mut by_type: BTreeMap<ContentType, TypeTally> = BTreeMap::new();
        for r in results {
            all.add(r);
            by_type.entry(r.kind.clone()).or_default().add(r);
        }
        Self { total: all.total, working: all.working, broken: all.broken, by_type, generated_at: Local::now() }
    }

    pub fn success_rate(&self) -> f64 {
        TypeTally { total: self.total, working: self.working, broken: self.broken }.success_rate()
    }

    /// Plain-text table for terminal output.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{:<10} {:>6} {:>8} {:>7}\n", "type", "total", "working", "broken"));
        for (kind, t) in &self.by_type {
            out.push_str(&format!("{:<10} {:>6} {:>8} {:>7}\n", kind.as_str(), t.total, t.working, t.broken));
        }
        out.push_str(&format!("{:<10} {:>6} {:>8} {:>7}\n", "all", self.total, self.working, self.broken));
        out.push_str(&format!("success rate: {:.1}%\n", self.success_rate()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentItem;

    fn result(kind: ContentType, ok: bool) -> CheckResult {
        let item = ContentItem::new(kind, "x", Some("https://x".into()));
        if ok {
            CheckResult::from_verdict(&item, crate::types::Verdict::working())
        } else {
            CheckResult::broken(&item, "nope")
        }
    }

    #[test]
    fn tallies_per_type() {
        let results = vec![
            result(ContentType::Radio, true),
            result(ContentType::Radio, false),
            result(ContentType::Channel, true),
            result(ContentType::Movie, false),
        ];
        let s = Summary::from_results(&results);
        assert_eq!((s.total, s.working, s.broken), (4, 2, 2));
        assert_eq!(s.by_type[&ContentType::Radio], TypeTally { total: 2, working: 1, broken: 1 });
        assert_eq!(s.by_type[&ContentType::Channel].working, 1);
        assert!(!s.by_type.contains_key(&ContentType::Music));
        assert!((s.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_run_has_zero_rate() {
        let s = Summary::from_results(&[]);
        assert_eq!(s.success_rate(), 0.0);
        assert!(s.render_table().contains("all"));
    }

    #[test]
    fn serializes_type_keys_as_names() {
        let s = Summary::from_results(&[result(ContentType::Music, true)]);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["by_type"]["music"]["working"], 1);
    }
}
