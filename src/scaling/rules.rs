//! Deterministic rule-based scaling verdicts
//!
//! The fallback behind the AI-assisted path. Reproducible from the
//! thresholds below alone, independent of model availability.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

use crate::domain::{ScalingDecision, ServiceMetrics};

const RULE_CONFIDENCE: f64 = 0.8;

const CPU_SCALE_UP: f64 = 75.0;
const MEMORY_SCALE_UP: f64 = 80.0;
const RESPONSE_TIME_SCALE_UP_MS: f64 = 500.0;
const ERROR_RATE_SCALE_UP: f64 = 1.0;
const ERROR_RATE_COORDINATION: f64 = 2.0;

const CPU_SCALE_DOWN: f64 = 30.0;
const MEMORY_SCALE_DOWN: f64 = 40.0;
const RESPONSE_TIME_SCALE_DOWN_MS: f64 = 200.0;
const ERROR_RATE_SCALE_DOWN: f64 = 0.1;

const BUSINESS_HOURS_START: u32 = 9;
const BUSINESS_HOURS_END: u32 = 17;

/// 09:00-17:00, Monday through Friday, in the service's reference timezone
pub fn is_business_hours(local_now: DateTime<FixedOffset>) -> bool {
    let hour = local_now.hour();
    let weekday = local_now.weekday().num_days_from_monday();
    (BUSINESS_HOURS_START..=BUSINESS_HOURS_END).contains(&hour) && weekday < 5
}

/// Rule-based verdict for one metrics snapshot
pub fn decide(
    metrics: &ServiceMetrics,
    local_now: DateTime<FixedOffset>,
    min_replicas: u32,
    max_replicas: u32,
) -> ScalingDecision {
    let should_scale_up = metrics.cpu_usage > CPU_SCALE_UP
        || metrics.memory_usage > MEMORY_SCALE_UP
        || metrics.response_time_avg > RESPONSE_TIME_SCALE_UP_MS
        || metrics.error_rate > ERROR_RATE_SCALE_UP;

    let should_scale_down = metrics.cpu_usage < CPU_SCALE_DOWN
        && metrics.memory_usage < MEMORY_SCALE_DOWN
        && metrics.response_time_avg < RESPONSE_TIME_SCALE_DOWN_MS
        && metrics.error_rate < ERROR_RATE_SCALE_DOWN
        && metrics.current_replicas > min_replicas;

    if should_scale_up {
        let target = (metrics.current_replicas + 1).min(max_replicas);
        ScalingDecision {
            service_name: metrics.service_name.clone(),
            current_replicas: metrics.current_replicas,
            target_replicas: target,
            reason: format!(
                "High resource usage detected (CPU: {:.1}%, Memory: {:.1}%)",
                metrics.cpu_usage, metrics.memory_usage
            ),
            confidence: RULE_CONFIDENCE,
            coordination_needed: metrics.error_rate > ERROR_RATE_COORDINATION,
            estimated_impact: "Expected to improve performance".to_string(),
            timestamp: chrono::Utc::now(),
        }
    } else if should_scale_down && !is_business_hours(local_now) {
        let target = (metrics.current_replicas - 1).max(min_replicas);
        ScalingDecision {
            service_name: metrics.service_name.clone(),
            current_replicas: metrics.current_replicas,
            target_replicas: target,
            reason: format!(
                "Low resource usage during off-hours (CPU: {:.1}%)",
                metrics.cpu_usage
            ),
            confidence: RULE_CONFIDENCE,
            coordination_needed: false,
            estimated_impact: "Expected to optimize resource usage".to_string(),
            timestamp: chrono::Utc::now(),
        }
    } else {
        ScalingDecision::hold(metrics, "Metrics within acceptable ranges", RULE_CONFIDENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn metrics(
        cpu: f64,
        memory: f64,
        response_time: f64,
        error_rate: f64,
        replicas: u32,
    ) -> ServiceMetrics {
        ServiceMetrics {
            service_name: "frontend".to_string(),
            cpu_usage: cpu,
            memory_usage: memory,
            current_replicas: replicas,
            desired_replicas: replicas,
            response_time_avg: response_time,
            request_rate: 50.0,
            error_rate,
            timestamp: Utc::now(),
        }
    }

    fn utc_fixed(y: i32, mo: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap().fixed_offset()
    }

    // Tuesday 2025-06-10, 22:00 (off hours)
    fn off_hours() -> DateTime<FixedOffset> {
        utc_fixed(2025, 6, 10, 22)
    }

    // Tuesday 2025-06-10, 11:00 (business hours)
    fn business_hours() -> DateTime<FixedOffset> {
        utc_fixed(2025, 6, 10, 11)
    }

    #[test]
    fn high_cpu_scales_up_without_coordination() {
        let decision = decide(&metrics(90.0, 50.0, 100.0, 0.5, 2), off_hours(), 1, 10);
        assert_eq!(decision.target_replicas, 3);
        assert!(!decision.coordination_needed);
    }

    #[test]
    fn high_error_rate_flags_coordination() {
        let decision = decide(&metrics(90.0, 50.0, 100.0, 2.5, 2), business_hours(), 1, 10);
        assert_eq!(decision.target_replicas, 3);
        assert!(decision.coordination_needed);
    }

    #[test]
    fn scale_up_caps_at_max_replicas() {
        let decision = decide(&metrics(90.0, 50.0, 100.0, 0.0, 10), off_hours(), 1, 10);
        assert_eq!(decision.target_replicas, 10);
    }

    #[test]
    fn idle_metrics_scale_down_off_hours() {
        let decision = decide(&metrics(10.0, 10.0, 50.0, 0.0, 3), off_hours(), 1, 10);
        assert_eq!(decision.target_replicas, 2);
    }

    #[test]
    fn idle_metrics_hold_during_business_hours() {
        let decision = decide(&metrics(10.0, 10.0, 50.0, 0.0, 3), business_hours(), 1, 10);
        assert_eq!(decision.target_replicas, 3);
        assert!(decision.is_hold());
    }

    #[test]
    fn scale_down_floors_at_min_replicas() {
        let decision = decide(&metrics(10.0, 10.0, 50.0, 0.0, 1), off_hours(), 1, 10);
        assert_eq!(decision.target_replicas, 1);
        assert!(decision.is_hold());
    }

    #[test]
    fn weekend_daytime_is_not_business_hours() {
        // Saturday 2025-06-14, 11:00
        let saturday = utc_fixed(2025, 6, 14, 11);
        assert!(!is_business_hours(saturday));

        let decision = decide(&metrics(10.0, 10.0, 50.0, 0.0, 3), saturday, 1, 10);
        assert_eq!(decision.target_replicas, 2);
    }

    #[test]
    fn business_hours_boundary_is_inclusive() {
        assert!(is_business_hours(utc_fixed(2025, 6, 10, 9)));
        assert!(is_business_hours(utc_fixed(2025, 6, 10, 17)));
        assert!(!is_business_hours(utc_fixed(2025, 6, 10, 18)));
        assert!(!is_business_hours(utc_fixed(2025, 6, 10, 8)));
    }

    #[test]
    fn middling_metrics_hold() {
        let decision = decide(&metrics(50.0, 50.0, 300.0, 0.5, 2), off_hours(), 1, 10);
        assert!(decision.is_hold());
        assert_eq!(decision.reason, "Metrics within acceptable ranges");
    }
}
