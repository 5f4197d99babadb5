use crate::{AlertCandidate, AlertInput, AlertRule};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use wearwatch_common::id::AlertIdSequence;
use wearwatch_common::types::{
    Alert, AlertLevel, AlertSummary, EngineSample, EnvironmentSample, LevelCounts, WearSnapshot,
};

pub const DEFAULT_COOLDOWN_SECS: u64 = 30;
/// Largest cooldown `chrono::Duration::seconds` accepts.
const MAX_COOLDOWN_SECS: u64 = (i64::MAX / 1000) as u64;

/// Key: (component, level)
type CooldownKey = (String, AlertLevel);

pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
    cooldown: Duration,
    last_fired: HashMap<CooldownKey, DateTime<Utc>>,
    ids: AlertIdSequence,
    active: HashMap<String, Alert>,
    history: Vec<Alert>,
}

impl AlertEngine {
    pub fn new(rules: Vec<Box<dyn AlertRule>>, cooldown_secs: u64) -> Self {
        Self {
            rules,
            cooldown: Duration::seconds(cooldown_secs.min(MAX_COOLDOWN_SECS) as i64),
            last_fired: HashMap::new(),
            ids: AlertIdSequence::new(),
            active: HashMap::new(),
            history: Vec::new(),
        }
    }

    pub fn rules(&self) -> &[Box<dyn AlertRule>] {
        &self.rules
    }

    pub fn add_rule(&mut self, rule: Box<dyn AlertRule>) {
        self.rules.push(rule);
    }

    pub fn evaluate_engine(&mut self, sample: &EngineSample, now: DateTime<Utc>) -> Vec<Alert> {
        self.evaluate(AlertInput::Engine(sample), now)
    }

    pub fn evaluate_environment(&mut self, sample: &EnvironmentSample, now: DateTime<Utc>) -> Vec<Alert> {
        self.evaluate(AlertInput::Environment(sample), now)
    }

    pub fn evaluate_wear(&mut self, snapshot: &WearSnapshot, now: DateTime<Utc>) -> Vec<Alert> {
        self.evaluate(AlertInput::Wear(snapshot), now)
    }

    /// Runs every rule and returns the alerts that survived the cooldown.
    ///
    /// A key that fired at most `cooldown` ago is suppressed, boundary included.
    pub fn evaluate(&mut self, input: AlertInput<'_>, now: DateTime<Utc>) -> Vec<Alert> {
        let candidates: Vec<AlertCandidate> = self
            .rules
            .iter()
            .flat_map(|rule| rule.evaluate(input))
            .collect();

        candidates
            .into_iter()
            .filter_map(|candidate| self.create(candidate, now))
            .collect()
    }

    fn create(&mut self, candidate: AlertCandidate, now: DateTime<Utc>) -> Option<Alert> {
        let key = (candidate.component.clone(), candidate.level);

        let suppressed = self
            .last_fired
            .get(&key)
            .is_some_and(|last| now - *last <= self.cooldown);
        if suppressed {
            tracing::debug!(
                component = %candidate.component,
                level = %candidate.level,
                "Alert suppressed (cooldown)"
            );
            return None;
        }

        let alert = Alert {
            id: self.ids.next_id(now),
            level: candidate.level,
            component: candidate.component,
            message: candidate.message,
            timestamp: now,
            data: candidate.data,
            acknowledged: false,
        };
        tracing::info!(
            id = %alert.id,
            component = %alert.component,
            level = %alert.level,
            "{}",
            alert.message
        );

        self.last_fired.insert(key, now);
        self.active.insert(alert.id.clone(), alert.clone());
        self.history.push(alert.clone());
        Some(alert)
    }

    /// Marks an active alert as acknowledged. Returns false for unknown ids.
    pub fn acknowledge(&mut self, id: &str) -> bool {
        match self.active.get_mut(id) {
            Some(alert) => {
                alert.acknowledged = true;
                true
            }
            None => false,
        }
    }

    /// Removes an alert from the active map. History is untouched.
    pub fn clear(&mut self, id: &str) -> Option<Alert> {
        let removed = self.active.remove(id);
        if removed.is_some() {
            tracing::info!(id, "Alert cleared");
        }
        removed
    }

    /// Active alerts, oldest first.
    pub fn active_alerts(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self.active.values().cloned().collect();
        alerts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        alerts
    }

    pub fn alerts_by_level(&self, level: AlertLevel) -> Vec<Alert> {
        self.active_alerts()
            .into_iter()
            .filter(|a| a.level == level)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.active.get(id)
    }

    pub fn summary(&self) -> AlertSummary {
        let mut by_level = LevelCounts::default();
        let mut unacknowledged = 0;
        for alert in self.active.values() {
            by_level.increment(alert.level);
            if !alert.acknowledged {
                unacknowledged += 1;
            }
        }
        AlertSummary {
            total: self.active.len(),
            by_level,
            unacknowledged,
        }
    }

    pub fn history(&self) -> &[Alert] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
