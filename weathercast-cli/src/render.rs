use chrono::{Local, TimeZone};
use std::fmt::{Display, Write};
use weathercast_core::AppState;

pub fn render(state: &AppState) -> String {
    render_in(state, &Local)
}

/// Three sections: current conditions, hourly and daily temperatures.
pub fn render_in<Tz>(state: &AppState, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let (Some(weather), Some(name)) = (&state.weather, &state.place_name) else {
        return out;
    };

    let _ = writeln!(out, "Today's Average Temperature");
    for condition in &weather.current.conditions {
        let _ = writeln!(
            out,
            "  {name} | {:.1}° | {}",
            weather.current.temperature, condition.description
        );
    }

    let _ = writeln!(out, "\nHourly Average Temperature");
    for point in &weather.hourly {
        let Some(time) = point.time() else { continue };
        let _ = writeln!(
            out,
            "  {} | {:.1}°",
            time.with_timezone(tz).format("%-I %p"),
            point.temperature
        );
    }

    let _ = writeln!(out, "\nDaily Average Temperature");
    for point in &weather.daily {
        let Some(time) = point.time() else { continue };
        let _ = writeln!(
            out,
            "  {} | {:.1}°",
            time.with_timezone(tz).format("%A, %b %-d"),
            point.day_temperature
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weathercast_core::{
        ConditionDetail, CurrentConditions, DailyPoint, HourlyPoint, WeatherSnapshot,
    };

    fn state() -> AppState {
        AppState {
            weather: Some(WeatherSnapshot {
                current: CurrentConditions {
                    temperature: 61.48,
                    conditions: vec![ConditionDetail {
                        id: 801,
                        description: "few clouds".into(),
                        icon_id: "02d".into(),
                    }],
                },
                // 2024-01-01 15:00 UTC, a Monday
                hourly: vec![HourlyPoint {
                    timestamp_unix_seconds: 1_704_121_200,
                    temperature: 60.0,
                    conditions: vec![],
                }],
                daily: vec![DailyPoint {
                    timestamp_unix_seconds: 1_704_121_200,
                    day_temperature: 63.25,
                    conditions: vec![],
                }],
            }),
            place_name: Some("San Francisco".into()),
            ..AppState::default()
        }
    }

    #[test]
    fn renders_three_sections() {
        let out = render_in(&state(), &Utc);

        assert!(out.contains("San Francisco | 61.5° | few clouds"));
        assert!(out.contains("3 PM | 60.0°"));
        assert!(out.contains("Monday, Jan 1 | 63.2°") || out.contains("Monday, Jan 1 | 63.3°"));
    }

    #[test]
    fn renders_nothing_without_weather() {
        assert!(render_in(&AppState::default(), &Utc).is_empty());
    }
}
