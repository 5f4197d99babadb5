use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Round `value` to `decimals` decimal places.
///
/// # Examples
///
/// ```
/// use wearwatch_common::types::round_to;
///
/// assert_eq!(round_to(12.3456, 2), 12.35);
/// assert_eq!(round_to(99.95, 1), 100.0);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ---- Components ----

/// A tracked vehicle component.
///
/// # Examples
///
/// ```
/// use wearwatch_common::types::Component;
///
/// let c: Component = "brakes".parse().unwrap();
/// assert_eq!(c, Component::Brakes);
/// assert_eq!(c.to_string(), "brakes");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Engine,
    Brakes,
    Transmission,
    Tires,
    Battery,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::Engine,
        Component::Brakes,
        Component::Transmission,
        Component::Tires,
        Component::Battery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Engine => "engine",
            Component::Brakes => "brakes",
            Component::Transmission => "transmission",
            Component::Tires => "tires",
            Component::Battery => "battery",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "engine" => Ok(Component::Engine),
            "brakes" => Ok(Component::Brakes),
            "transmission" => Ok(Component::Transmission),
            "tires" => Ok(Component::Tires),
            "battery" => Ok(Component::Battery),
            _ => Err(format!("unknown component: {s}")),
        }
    }
}

/// Coarse health classification derived from a health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Good,
    Warning,
    Critical,
    Failure,
}

impl ComponentStatus {
    pub fn from_health(health_score: f64) -> Self {
        if health_score >= 80.0 {
            ComponentStatus::Good
        } else if health_score >= 50.0 {
            ComponentStatus::Warning
        } else if health_score >= 20.0 {
            ComponentStatus::Critical
        } else {
            ComponentStatus::Failure
        }
    }
}

impl std::fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentStatus::Good => write!(f, "good"),
            ComponentStatus::Warning => write!(f, "warning"),
            ComponentStatus::Critical => write!(f, "critical"),
            ComponentStatus::Failure => write!(f, "failure"),
        }
    }
}

// ---- Inbound samples ----

pub const DEFAULT_RPM: f64 = 0.0;
pub const DEFAULT_SPEED: f64 = 0.0;
pub const DEFAULT_COOLANT_TEMP: f64 = 90.0;
pub const DEFAULT_THROTTLE: f64 = 0.0;
pub const DEFAULT_FUEL_LEVEL: f64 = 100.0;
pub const DEFAULT_TEMPERATURE: f64 = 25.0;
pub const DEFAULT_PRESSURE: f64 = 101.0;
pub const DEFAULT_HUMIDITY: f64 = 50.0;
pub const DEFAULT_VIBRATION: f64 = 0.0;

fn or_default(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Raw engine/OBD reading as delivered by the transport. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineReading {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub coolant_temp: Option<f64>,
    #[serde(default)]
    pub throttle: Option<f64>,
    #[serde(default)]
    pub fuel_level: Option<f64>,
}

impl EngineReading {
    /// Applies field defaults. Non-finite values count as missing.
    pub fn into_sample(self, received_at: DateTime<Utc>) -> EngineSample {
        EngineSample {
            timestamp: self.timestamp.unwrap_or(received_at),
            rpm: or_default(self.rpm, DEFAULT_RPM),
            speed: or_default(self.speed, DEFAULT_SPEED),
            coolant_temp: or_default(self.coolant_temp, DEFAULT_COOLANT_TEMP),
            throttle: or_default(self.throttle, DEFAULT_THROTTLE),
            fuel_level: or_default(self.fuel_level, DEFAULT_FUEL_LEVEL),
        }
    }
}

/// Raw environment/sensor reading. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentReading {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub vibration: Option<f64>,
}

impl EnvironmentReading {
    pub fn into_sample(self, received_at: DateTime<Utc>) -> EnvironmentSample {
        EnvironmentSample {
            timestamp: self.timestamp.unwrap_or(received_at),
            temperature: or_default(self.temperature, DEFAULT_TEMPERATURE),
            pressure: or_default(self.pressure, DEFAULT_PRESSURE),
            humidity: or_default(self.humidity, DEFAULT_HUMIDITY),
            vibration: or_default(self.vibration, DEFAULT_VIBRATION),
        }
    }
}

/// Engine/OBD sample with all defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSample {
    pub timestamp: DateTime<Utc>,
    pub rpm: f64,
    pub speed: f64,
    pub coolant_temp: f64,
    pub throttle: f64,
    pub fuel_level: f64,
}

impl EngineSample {
    /// Sample carrying only default values, stamped at `timestamp`.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        EngineReading::default().into_sample(timestamp)
    }
}

/// Environment/sensor sample with all defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub vibration: f64,
}

impl EnvironmentSample {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        EnvironmentReading::default().into_sample(timestamp)
    }
}

// ---- Wear ----

/// Per-component wear state as handed out in snapshots (display-rounded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentWearView {
    pub name: Component,
    pub wear_percentage: f64,
    pub health_score: f64,
    pub accumulated_stress: f64,
    pub hours_until_maintenance: f64,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub status: ComponentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WearSnapshot {
    pub components: BTreeMap<Component, ComponentWearView>,
    pub runtime_hours: f64,
    pub overall_health: f64,
}

impl WearSnapshot {
    pub fn component(&self, component: Component) -> Option<&ComponentWearView> {
        self.components.get(&component)
    }
}

// ---- Alerts ----

/// Alert level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use wearwatch_common::types::AlertLevel;
///
/// let level: AlertLevel = "critical".parse().unwrap();
/// assert_eq!(level, AlertLevel::Critical);
/// assert!(AlertLevel::Emergency > AlertLevel::Critical);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Info => write!(f, "info"),
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Critical => write!(f, "critical"),
            AlertLevel::Emergency => write!(f, "emergency"),
        }
    }
}

impl std::str::FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(AlertLevel::Info),
            "warning" => Ok(AlertLevel::Warning),
            "critical" => Ok(AlertLevel::Critical),
            "emergency" => Ok(AlertLevel::Emergency),
            _ => Err(format!("unknown alert level: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub level: AlertLevel,
    /// Component name; includes non-wear sources such as `"fuel"`.
    pub component: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub data: BTreeMap<String, f64>,
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub emergency: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl LevelCounts {
    pub fn increment(&mut self, level: AlertLevel) {
        match level {
            AlertLevel::Emergency => self.emergency += 1,
            AlertLevel::Critical => self.critical += 1,
            AlertLevel::Warning => self.warning += 1,
            AlertLevel::Info => self.info += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,
    pub by_level: LevelCounts,
    pub unacknowledged: usize,
}

// ---- Forecasts ----

/// Risk of a forecast prediction, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Moderate => write!(f, "moderate"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Degrading,
    CriticalDegradation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub component: Component,
    pub problem_type: String,
    pub risk_level: RiskLevel,
    pub estimated_time_to_failure_hours: Option<f64>,
    pub confidence: f64,
    pub trend: TrendDirection,
    pub description: String,
    pub recommendation: String,
    /// Supporting values observed when the prediction was made.
    pub data: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthProjection {
    pub health_in_1h: f64,
    pub health_in_24h: f64,
    pub health_in_7d: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentForecast {
    pub name: Component,
    pub current_health: f64,
    pub forecast: HealthProjection,
    pub estimated_remaining_life_hours: f64,
    pub trend: TrendDirection,
    pub risk_factors: Vec<String>,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounters {
    pub high_rpm_events: u64,
    pub overheating_events: u64,
    pub high_vibration_events: u64,
    pub hard_braking_events: u64,
    pub pressure_anomaly_events: u64,
    pub high_throttle_events: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_predictions: usize,
    pub risk_distribution: RiskDistribution,
    pub event_counters: EventCounters,
    pub data_points_collected: BTreeMap<String, usize>,
    pub runtime_hours: f64,
    pub highest_risk_predictions: Vec<Prediction>,
}

// ---- Costs ----

/// Repair severity tier used for catalog lookup, ordered from cheapest to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Preventive,
    Minor,
    Major,
    Critical,
}

impl SeverityTier {
    /// The next tier towards `Preventive`, or `None` when already there.
    pub fn step_down(self) -> Option<SeverityTier> {
        match self {
            SeverityTier::Critical => Some(SeverityTier::Major),
            SeverityTier::Major => Some(SeverityTier::Minor),
            SeverityTier::Minor => Some(SeverityTier::Preventive),
            SeverityTier::Preventive => None,
        }
    }

    pub fn urgency(self) -> RepairUrgency {
        match self {
            SeverityTier::Preventive => RepairUrgency::Preventive,
            SeverityTier::Minor => RepairUrgency::Recommended,
            SeverityTier::Major => RepairUrgency::Urgent,
            SeverityTier::Critical => RepairUrgency::Critical,
        }
    }
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityTier::Preventive => write!(f, "preventive"),
            SeverityTier::Minor => write!(f, "minor"),
            SeverityTier::Major => write!(f, "major"),
            SeverityTier::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairUrgency {
    Preventive,
    Recommended,
    Urgent,
    Critical,
}

pub const CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub parts: f64,
    pub labor: f64,
    pub labor_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairCost {
    pub component: Component,
    pub problem_type: String,
    pub description: String,
    pub tier: SeverityTier,
    pub cost_range: CostRange,
    pub breakdown: CostBreakdown,
    pub urgency: RepairUrgency,
    pub savings_if_preventive: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_estimated: CostRange,
    pub potential_savings_if_preventive: f64,
    pub repair_count: usize,
    pub repairs: Vec<RepairCost>,
    pub timestamp: DateTime<Utc>,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceItem {
    pub item: String,
    pub component: Component,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    pub maintenance_items: Vec<MaintenanceItem>,
    pub total_preventive_cost: f64,
    pub currency: String,
}

// ---- Published records ----

/// Periodic wear/alert snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WearReport {
    pub timestamp: DateTime<Utc>,
    pub wear_state: WearSnapshot,
    pub alert_summary: AlertSummary,
    pub active_alerts: Vec<Alert>,
}

/// Periodic forecast + cost snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub timestamp: DateTime<Utc>,
    pub component_forecasts: BTreeMap<Component, ComponentForecast>,
    pub all_predictions: Vec<Prediction>,
    pub summary: ForecastSummary,
    pub overall_health: f64,
    pub cost_estimate: CostSummary,
}

/// Everything the engine hands to the output side. Values are owned copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    Alert(Alert),
    AlertCleared { id: String, timestamp: DateTime<Utc> },
    WearReport(WearReport),
    ForecastReport(ForecastReport),
}

impl OutputEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            OutputEvent::Alert(_) => "alert",
            OutputEvent::AlertCleared { .. } => "alert_cleared",
            OutputEvent::WearReport(_) => "wear_report",
            OutputEvent::ForecastReport(_) => "forecast_report",
        }
    }

    /// Level used for per-sink routing; only alerts carry one.
    pub fn alert_level(&self) -> Option<AlertLevel> {
        match self {
            OutputEvent::Alert(alert) => Some(alert.level),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_reading_applies_defaults() {
        let ts = Utc::now();
        let reading: EngineReading = serde_json::from_str(r#"{"rpm": 3000}"#).unwrap();
        let sample = reading.into_sample(ts);
        assert_eq!(sample.rpm, 3000.0);
        assert_eq!(sample.coolant_temp, DEFAULT_COOLANT_TEMP);
        assert_eq!(sample.fuel_level, DEFAULT_FUEL_LEVEL);
        assert_eq!(sample.timestamp, ts);
    }

    #[test]
    fn non_finite_values_are_replaced() {
        let reading = EnvironmentReading {
            pressure: Some(f64::NAN),
            vibration: Some(f64::INFINITY),
            ..Default::default()
        };
        let sample = reading.into_sample(Utc::now());
        assert_eq!(sample.pressure, DEFAULT_PRESSURE);
        assert_eq!(sample.vibration, DEFAULT_VIBRATION);
    }

    #[test]
    fn status_bands() {
        assert_eq!(ComponentStatus::from_health(100.0), ComponentStatus::Good);
        assert_eq!(ComponentStatus::from_health(80.0), ComponentStatus::Good);
        assert_eq!(ComponentStatus::from_health(79.9), ComponentStatus::Warning);
        assert_eq!(ComponentStatus::from_health(20.0), ComponentStatus::Critical);
        assert_eq!(ComponentStatus::from_health(19.9), ComponentStatus::Failure);
    }

    #[test]
    fn orderings_are_total() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Moderate);
        assert!(RiskLevel::Moderate > RiskLevel::Low);
        assert!(AlertLevel::Info < AlertLevel::Warning);
        assert_eq!(SeverityTier::Critical.step_down(), Some(SeverityTier::Major));
        assert_eq!(SeverityTier::Preventive.step_down(), None);
    }

    #[test]
    fn output_event_is_tagged() {
        let event = OutputEvent::AlertCleared {
            id: "ALT-1-0001".into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "alert_cleared");
        assert_eq!(json["id"], "ALT-1-0001");
    }
}
