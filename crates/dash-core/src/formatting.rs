use crate::models::TimeAxisMode;
use crate::time_utils;

/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use dash_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(220.0, 0), "220");
/// assert_eq!(format_number(-1234.56, 1), "-1,234.6");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Total energy consumed in a period, e.g. `"12.345 kWh"`.
pub fn format_energy(kwh: f64) -> String {
    format!("{:.3} kWh", kwh)
}

/// Tick / hover label for an x coordinate.
///
/// Absolute axes print `HH:MM:SS`; elapsed axes print minutes.
pub fn format_axis_value(mode: TimeAxisMode, x: f64) -> String {
    match mode {
        TimeAxisMode::AbsoluteTime => time_utils::axis_to_datetime(x)
            .map(|dt| dt.format(time_utils::CLOCK_FORMAT).to_string())
            .unwrap_or_default(),
        TimeAxisMode::ElapsedMinutes => format!("{} min", format_number(x, 1)),
    }
}

/// Legend name of an experiment: the file name up to its first `.`.
pub fn legend_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 2), "1,000.00");
        assert_eq!(format_number(0.0, 1), "0.0");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9876.5, 1), "-9,876.5");
        assert_eq!(format_number(-0.001, 1), "0.0");
    }

    #[test]
    fn test_format_energy() {
        assert_eq!(format_energy(12.3456), "12.346 kWh");
        assert_eq!(format_energy(0.0), "0.000 kWh");
    }

    #[test]
    fn test_format_axis_value_absolute() {
        let t = NaiveTime::from_hms_opt(9, 30, 5).unwrap();
        let x = time_utils::datetime_to_axis(time_utils::on_base_date(t));
        assert_eq!(format_axis_value(TimeAxisMode::AbsoluteTime, x), "09:30:05");
    }

    #[test]
    fn test_format_axis_value_elapsed() {
        assert_eq!(
            format_axis_value(TimeAxisMode::ElapsedMinutes, 1.5),
            "1.5 min"
        );
        assert_eq!(
            format_axis_value(TimeAxisMode::ElapsedMinutes, 1440.0),
            "1,440.0 min"
        );
    }

    #[test]
    fn test_legend_name() {
        assert_eq!(legend_name("ensaio_01.xlsx"), "ensaio_01");
        assert_eq!(legend_name("camara.v2.xlsx"), "camara");
        assert_eq!(legend_name("semextensao"), "semextensao");
    }
}
