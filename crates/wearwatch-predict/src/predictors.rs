//! Problem-specific predictors, one group per component.
//!
//! Each predictor inspects recent metric averages, slopes and event counters and
//! emits zero or more [`Prediction`]s. Confidence values are capped per predictor.

use crate::forecast::{hours_to_threshold, Metric, TrendForecaster, RECENT_WINDOW};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use wearwatch_common::types::{Component, Prediction, RiskLevel, TrendDirection};

struct Draft {
    component: Component,
    problem_type: &'static str,
    risk_level: RiskLevel,
    eta_hours: Option<f64>,
    confidence: f64,
    trend: TrendDirection,
    description: String,
    recommendation: &'static str,
}

impl Draft {
    fn build(self, data: &[(&str, f64)], now: DateTime<Utc>) -> Prediction {
        Prediction {
            component: self.component,
            problem_type: self.problem_type.to_string(),
            risk_level: self.risk_level,
            estimated_time_to_failure_hours: self.eta_hours,
            confidence: self.confidence.clamp(0.0, 100.0),
            trend: self.trend,
            description: self.description,
            recommendation: self.recommendation.to_string(),
            data: data
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            timestamp: now,
        }
    }
}

impl TrendForecaster {
    pub fn predict_engine_issues(&self, now: DateTime<Utc>) -> Vec<Prediction> {
        let mut predictions = Vec::new();
        let engine = &self.thresholds.engine;

        let coolant_avg = self.average(Metric::CoolantTemp, RECENT_WINDOW);
        let coolant_slope = self.slope(Metric::CoolantTemp);
        let coolant_latest = self.latest(Metric::CoolantTemp);

        if let (Some(avg), Some(slope), Some(latest)) = (coolant_avg, coolant_slope, coolant_latest) {
            if slope > 0.05 && avg > 85.0 {
                let risk = if latest > engine.coolant_temp_warning {
                    RiskLevel::Critical
                } else if latest > 95.0 {
                    RiskLevel::High
                } else {
                    RiskLevel::Moderate
                };
                let target = if latest < engine.coolant_temp_warning {
                    engine.coolant_temp_warning
                } else {
                    engine.coolant_temp_critical
                };
                let eta = hours_to_threshold(latest, target, self.rate(Metric::CoolantTemp), true);
                let samples = self.samples(Metric::CoolantTemp) as f64;

                predictions.push(
                    Draft {
                        component: Component::Engine,
                        problem_type: "overheating",
                        risk_level: risk,
                        eta_hours: eta,
                        confidence: (50.0 + samples / 10.0).min(90.0),
                        trend: TrendDirection::Degrading,
                        description: format!(
                            "Rising engine temperature trend. Average {avg:.1}°C, latest {latest:.1}°C, trend +{slope:.2}°C/sample."
                        ),
                        recommendation: "Check coolant level, thermostat and radiator. Avoid aggressive driving until inspected.",
                    }
                    .build(
                        &[
                            ("average_temp", avg),
                            ("current_temp", latest),
                            ("trend_slope", slope),
                            ("target_threshold", target),
                            ("overheating_events", self.counters.overheating_events as f64),
                        ],
                        now,
                    ),
                );
            }
        }

        let rpm_samples = self.samples(Metric::Rpm);
        let high_rpm_ratio = self.counters.high_rpm_events as f64 / rpm_samples.max(1) as f64;
        if high_rpm_ratio > 0.1 {
            let wear_rate = high_rpm_ratio * 2.0;
            predictions.push(
                Draft {
                    component: Component::Engine,
                    problem_type: "excessive_wear",
                    risk_level: if high_rpm_ratio > 0.2 {
                        RiskLevel::High
                    } else {
                        RiskLevel::Moderate
                    },
                    eta_hours: Some(500.0 / (1.0 + wear_rate)),
                    confidence: (40.0 + high_rpm_ratio * 200.0).min(85.0),
                    trend: TrendDirection::Degrading,
                    description: format!(
                        "Frequent high-RPM operation ({:.1}% of samples) accelerates engine wear.",
                        high_rpm_ratio * 100.0
                    ),
                    recommendation: "Shift up earlier and keep revs lower. Consider more frequent oil changes.",
                }
                .build(
                    &[
                        ("high_rpm_ratio", high_rpm_ratio),
                        ("avg_rpm", self.average(Metric::Rpm, RECENT_WINDOW).unwrap_or(0.0)),
                        ("high_rpm_events", self.counters.high_rpm_events as f64),
                        ("estimated_extra_wear_per_100h", wear_rate * 100.0),
                    ],
                    now,
                ),
            );
        }

        predictions
    }

    pub fn predict_brake_issues(&self, now: DateTime<Utc>) -> Vec<Prediction> {
        let mut predictions = Vec::new();
        let warning = self.thresholds.brakes.vibration_warning;
        let hard_brakings = self.counters.hard_braking_events;

        let vibration_avg = self.average(Metric::Vibration, RECENT_WINDOW);
        let vibration_slope = self.slope(Metric::Vibration);
        if let (Some(avg), Some(slope)) = (vibration_avg, vibration_slope) {
            if slope > 0.02 {
                let eta = if avg < warning {
                    hours_to_threshold(avg, warning, self.rate(Metric::Vibration), true)
                } else {
                    None
                };
                let risk = if avg > 5.0 {
                    RiskLevel::High
                } else if avg > 3.0 {
                    RiskLevel::Moderate
                } else {
                    RiskLevel::Low
                };
                let samples = self.samples(Metric::Vibration) as f64;
                predictions.push(
                    Draft {
                        component: Component::Brakes,
                        problem_type: "wear_degradation",
                        risk_level: risk,
                        eta_hours: eta,
                        confidence: (45.0 + samples / 15.0).min(80.0),
                        trend: TrendDirection::Degrading,
                        description: format!(
                            "Progressive vibration increase (average {avg:.2}). May indicate worn pads or discs."
                        ),
                        recommendation: "Inspect brake pads and discs. If vibration persists, check suspension and alignment.",
                    }
                    .build(
                        &[
                            ("current_vibration", avg),
                            ("trend_slope", slope),
                            ("hard_braking_events", hard_brakings as f64),
                        ],
                        now,
                    ),
                );
            }
        }

        let runtime_hours = self.runtime_hours();
        if runtime_hours > 0.01 {
            let braking_rate = hard_brakings as f64 / runtime_hours;
            if braking_rate > 10.0 {
                predictions.push(
                    Draft {
                        component: Component::Brakes,
                        problem_type: "accelerated_wear",
                        risk_level: if braking_rate < 20.0 {
                            RiskLevel::Moderate
                        } else {
                            RiskLevel::High
                        },
                        eta_hours: Some(self.intervals.brake_inspection / (1.0 + braking_rate / 20.0)),
                        confidence: 70.0,
                        trend: TrendDirection::Degrading,
                        description: format!(
                            "Frequent hard braking ({braking_rate:.1}/hour) shortens brake life."
                        ),
                        recommendation: "Keep a larger following distance and anticipate stops. Schedule an early brake inspection.",
                    }
                    .build(
                        &[
                            ("hard_braking_rate_per_hour", braking_rate),
                            ("total_hard_brakings", hard_brakings as f64),
                        ],
                        now,
                    ),
                );
            }
        }

        predictions
    }

    pub fn predict_tire_issues(&self, now: DateTime<Utc>) -> Vec<Prediction> {
        let mut predictions = Vec::new();
        let tires = &self.thresholds.tires;

        let pressure_avg = self.average(Metric::Pressure, RECENT_WINDOW);
        let pressure_slope = self.slope(Metric::Pressure);
        if let (Some(avg), Some(slope)) = (pressure_avg, pressure_slope) {
            if slope < -0.01 {
                let eta = hours_to_threshold(avg, tires.pressure_min, self.rate(Metric::Pressure), false);
                predictions.push(
                    Draft {
                        component: Component::Tires,
                        problem_type: "pressure_loss",
                        risk_level: if avg > 98.0 {
                            RiskLevel::Moderate
                        } else {
                            RiskLevel::High
                        },
                        eta_hours: eta,
                        confidence: (50.0 + slope.abs() * 100.0).min(75.0),
                        trend: TrendDirection::Degrading,
                        description: format!(
                            "Tire pressure is dropping. Average {avg:.1} kPa, trend {slope:.3}/sample."
                        ),
                        recommendation: "Check tire pressure. Look for punctures, leaks or faulty valves.",
                    }
                    .build(
                        &[
                            ("current_pressure", avg),
                            ("trend_slope", slope),
                            ("anomaly_events", self.counters.pressure_anomaly_events as f64),
                            ("min_threshold", tires.pressure_min),
                        ],
                        now,
                    ),
                );
            }
        }

        if let Some(speed_avg) = self.average(Metric::Speed, RECENT_WINDOW).filter(|s| *s > 100.0) {
            let wear_factor = (speed_avg - 80.0) / 40.0;
            predictions.push(
                Draft {
                    component: Component::Tires,
                    problem_type: "high_speed_wear",
                    risk_level: if speed_avg < 130.0 {
                        RiskLevel::Moderate
                    } else {
                        RiskLevel::High
                    },
                    eta_hours: Some(self.intervals.tire_rotation / (1.0 + wear_factor)),
                    confidence: 65.0,
                    trend: TrendDirection::Degrading,
                    description: format!(
                        "High average speed ({speed_avg:.0} km/h) accelerates tread wear."
                    ),
                    recommendation: "Lower cruising speed. Rotate tires more often and check tread depth.",
                }
                .build(&[("avg_speed", speed_avg), ("wear_factor", wear_factor)], now),
            );
        }

        predictions
    }

    pub fn predict_transmission_issues(&self, now: DateTime<Utc>) -> Vec<Prediction> {
        let mut predictions = Vec::new();
        let rpm_avg = self.average(Metric::Rpm, RECENT_WINDOW);
        let speed_avg = self.average(Metric::Speed, RECENT_WINDOW);

        if let (Some(rpm), Some(speed)) = (rpm_avg, speed_avg) {
            if speed > 0.0 {
                let ratio = rpm / speed;
                if ratio > self.thresholds.transmission.rpm_speed_ratio_warning {
                    predictions.push(
                        Draft {
                            component: Component::Transmission,
                            problem_type: "gear_stress",
                            risk_level: RiskLevel::Moderate,
                            eta_hours: Some(800.0),
                            confidence: 60.0,
                            trend: TrendDirection::Degrading,
                            description: format!(
                                "High RPM to speed ratio ({ratio:.1}) suggests low gears are held too long."
                            ),
                            recommendation: "Shift to higher gears sooner. Check the clutch on manual gearboxes.",
                        }
                        .build(
                            &[("rpm_speed_ratio", ratio), ("avg_rpm", rpm), ("avg_speed", speed)],
                            now,
                        ),
                    );
                }
            }
        }

        if let Some(throttle_avg) = self.average(Metric::Throttle, RECENT_WINDOW).filter(|t| *t > 60.0) {
            let ratio = self.counters.high_throttle_events as f64
                / self.samples(Metric::Throttle).max(1) as f64;
            if ratio > 0.15 {
                predictions.push(
                    Draft {
                        component: Component::Transmission,
                        problem_type: "aggressive_driving_wear",
                        risk_level: RiskLevel::Moderate,
                        eta_hours: Some(self.intervals.transmission_service * 0.7),
                        confidence: 55.0,
                        trend: TrendDirection::Degrading,
                        description: format!(
                            "Aggressive throttle use ({:.0}% of samples at high throttle).",
                            ratio * 100.0
                        ),
                        recommendation: "Accelerate more progressively. Consider an early transmission service.",
                    }
                    .build(&[("high_throttle_ratio", ratio), ("avg_throttle", throttle_avg)], now),
                );
            }
        }

        predictions
    }

    pub fn predict_battery_issues(&self, now: DateTime<Utc>) -> Vec<Prediction> {
        let battery = &self.thresholds.battery;
        let Some(temp_avg) = self.average(Metric::Temperature, RECENT_WINDOW) else {
            return Vec::new();
        };

        if temp_avg > battery.temp_max - 5.0 {
            let degradation = (temp_avg - 35.0) / 10.0;
            vec![Draft {
                component: Component::Battery,
                problem_type: "heat_degradation",
                risk_level: if temp_avg < 40.0 {
                    RiskLevel::Moderate
                } else {
                    RiskLevel::High
                },
                eta_hours: Some(2000.0 / (1.0 + degradation)),
                confidence: 50.0,
                trend: TrendDirection::Degrading,
                description: format!(
                    "High ambient temperature ({temp_avg:.1}°C) accelerates battery degradation."
                ),
                recommendation: "Park in the shade when possible. Test the battery if starting becomes difficult.",
            }
            .build(&[("avg_temperature", temp_avg), ("degradation_factor", degradation)], now)]
        } else if temp_avg < battery.temp_min + 5.0 {
            vec![Draft {
                component: Component::Battery,
                problem_type: "cold_performance",
                risk_level: RiskLevel::Low,
                eta_hours: None,
                confidence: 60.0,
                trend: TrendDirection::Stable,
                description: format!(
                    "Low ambient temperature ({temp_avg:.1}°C) temporarily reduces battery capacity."
                ),
                recommendation: "Pre-warm the vehicle before long trips. Check battery charge in winter.",
            }
            .build(&[("avg_temperature", temp_avg)], now)]
        } else {
            Vec::new()
        }
    }
}
